//! Command implementations
//!
//! Every command that touches the controller receives the one [`Session`]
//! built in `main`; state is loaded and saved per command.

pub mod check;
pub mod lifecycle;
pub mod list;
pub mod refresh;

use anyhow::Result;
use std::path::PathBuf;

use crate::state::ProviderState;

/// Global context for the application
pub struct Context {
    pub verbose: u8,
    pub quiet: bool,
    pub state_path: PathBuf,
}

impl Context {
    pub fn load_state(&self) -> Result<ProviderState> {
        ProviderState::load(&self.state_path)
    }

    pub fn save_state(&self, state: &mut ProviderState) -> Result<()> {
        state.save(&self.state_path)
    }
}
