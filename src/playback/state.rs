/// Top-level controller states gating when lookahead and reload actions are
/// permitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Initial,
    Loading,
    LoadingAdditional,
    HasData,
    Failed,
}

impl ControllerState {
    /// Lookahead triggering is a no-op while a load is already in flight.
    pub fn is_loading(self) -> bool {
        matches!(
            self,
            ControllerState::Loading | ControllerState::LoadingAdditional
        )
    }
}
