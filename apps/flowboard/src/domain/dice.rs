//! Die sources. The engine only sees the [`DieSource`] trait so tests and
//! replays can script the faces.

use std::collections::VecDeque;
use std::sync::Mutex;

use rand::prelude::*;

use crate::domain::roll::DIE_FACES;
use crate::errors::domain::DomainError;

pub trait DieSource: Send + Sync {
    /// Draw one face in `1..=6`.
    fn roll(&self) -> Result<u8, DomainError>;
}

/// Uniform d6 backed by a `StdRng`.
///
/// Wrapped in `Mutex` since `DieSource::roll` takes `&self`.
pub struct RandomDie {
    rng: Mutex<StdRng>,
}

impl RandomDie {
    /// `Some(seed)` gives a reproducible sequence, `None` seeds from the OS.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_os_rng(),
        };
        Self {
            rng: Mutex::new(rng),
        }
    }
}

impl DieSource for RandomDie {
    fn roll(&self) -> Result<u8, DomainError> {
        let mut rng = self
            .rng
            .lock()
            .map_err(|e| DomainError::contract(format!("die RNG lock poisoned: {e}")))?;
        Ok(rng.random_range(DIE_FACES))
    }
}

/// Replays a fixed list of faces, then fails.
pub struct ScriptedDie {
    faces: Mutex<VecDeque<u8>>,
}

impl ScriptedDie {
    pub fn new(faces: impl IntoIterator<Item = u8>) -> Self {
        Self {
            faces: Mutex::new(faces.into_iter().collect()),
        }
    }

    pub fn remaining(&self) -> usize {
        self.faces.lock().map(|f| f.len()).unwrap_or(0)
    }
}

impl DieSource for ScriptedDie {
    fn roll(&self) -> Result<u8, DomainError> {
        let mut faces = self
            .faces
            .lock()
            .map_err(|e| DomainError::contract(format!("scripted die lock poisoned: {e}")))?;
        faces
            .pop_front()
            .ok_or_else(|| DomainError::contract("scripted die exhausted"))
    }
}
