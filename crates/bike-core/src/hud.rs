//! What the overlay should show, derived from the engine state.

use crate::state::EngineState;

#[derive(Clone, Debug, PartialEq)]
pub enum HudView {
    /// Before the first interaction.
    StartPrompt,
    Starting,
    Running { rpm: u32 },
}

impl HudView {
    /// The prompt stays up until the startup script has actually begun, so a
    /// denied audio output leaves it in place for another try.
    pub fn derive(state: &EngineState) -> Self {
        if state.is_starting {
            HudView::Starting
        } else if state.is_running {
            HudView::Running {
                rpm: state.current_rpm.max(0.0).round() as u32,
            }
        } else {
            HudView::StartPrompt
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            HudView::StartPrompt => "ROYAL ENFIELD HIMALAYAN",
            HudView::Starting => "Starting Engine...",
            HudView::Running { .. } => "ENGINE RUNNING",
        }
    }

    pub fn detail(&self) -> String {
        match self {
            HudView::StartPrompt => "Click to Start Engine".to_string(),
            HudView::Starting => "411cc Single Cylinder Thumper".to_string(),
            HudView::Running { rpm } => format!("RPM {rpm}"),
        }
    }

    /// Single-line form for window titles and logs.
    pub fn summary(&self) -> String {
        format!("{} · {}", self.title(), self.detail())
    }
}

/// Canvas opacity `elapsed` seconds after load: power2-out over `duration`.
pub fn fade_in_opacity(elapsed: f32, duration: f32) -> f32 {
    if duration <= 0.0 {
        return 1.0;
    }
    let x = (elapsed / duration).clamp(0.0, 1.0);
    1.0 - (1.0 - x) * (1.0 - x)
}
