//! The single-assignment result cell.
use crate::error::{AlreadySettled, Error};
use std::sync::Mutex;

/// Holds `None` until written, then one `Result` forever.
#[derive(Debug)]
pub(crate) struct ResultCell<T> {
    result: Mutex<Option<Result<T, Error>>>,
}

impl<T> ResultCell<T> {
    pub(crate) fn empty() -> Self {
        Self { result: Mutex::new(None) }
    }

    pub(crate) fn with(result: Result<T, Error>) -> Self {
        Self { result: Mutex::new(Some(result)) }
    }

    /// Writes `result` if the cell is empty. A second write is rejected and
    /// the stored result is left untouched.
    pub(crate) fn write(&self, result: Result<T, Error>) -> Result<(), AlreadySettled> {
        let mut slot = self.result.lock().unwrap();
        if slot.is_some() {
            return Err(AlreadySettled);
        }
        *slot = Some(result);
        Ok(())
    }

    pub(crate) fn is_written(&self) -> bool {
        self.result.lock().unwrap().is_some()
    }
}

impl<T: Clone> ResultCell<T> {
    pub(crate) fn read(&self) -> Option<Result<T, Error>> {
        self.result.lock().unwrap().clone()
    }
}
