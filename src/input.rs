// ============================================================================
// input.rs — Gray-Scott
// Keyboard bindings: reset and paired -/+ nudges per parameter.
// ============================================================================

use crate::config::ParamKind;

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum KeyAction {
    Reset,
    Nudge(ParamKind, f32),
}

/// Map a typed character to its action. Digits come in down/up pairs:
/// `1`/`2` feed, `3`/`4` kill, `5`/`6` diffusion A, `7`/`8` diffusion B,
/// `9`/`0` scale.
pub fn key_action(text: &str) -> Option<KeyAction> {
    let action = match text {
        "r" | "R" => KeyAction::Reset,
        "1" => KeyAction::Nudge(ParamKind::FeedRate, -1.0),
        "2" => KeyAction::Nudge(ParamKind::FeedRate, 1.0),
        "3" => KeyAction::Nudge(ParamKind::KillRate, -1.0),
        "4" => KeyAction::Nudge(ParamKind::KillRate, 1.0),
        "5" => KeyAction::Nudge(ParamKind::DiffusionA, -1.0),
        "6" => KeyAction::Nudge(ParamKind::DiffusionA, 1.0),
        "7" => KeyAction::Nudge(ParamKind::DiffusionB, -1.0),
        "8" => KeyAction::Nudge(ParamKind::DiffusionB, 1.0),
        "9" => KeyAction::Nudge(ParamKind::Scale, -1.0),
        "0" => KeyAction::Nudge(ParamKind::Scale, 1.0),
        _ => return None,
    };
    Some(action)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_parameter_has_a_down_up_pair() {
        for kind in ParamKind::ALL {
            let bound: Vec<f32> = "1234567890"
                .chars()
                .filter_map(|c| match key_action(&c.to_string()) {
                    Some(KeyAction::Nudge(k, dir)) if k == kind => Some(dir),
                    _ => None,
                })
                .collect();
            assert_eq!(bound, vec![-1.0, 1.0], "{kind:?}");
        }
    }

    #[test]
    fn reset_ignores_case() {
        assert_eq!(key_action("r"), Some(KeyAction::Reset));
        assert_eq!(key_action("R"), Some(KeyAction::Reset));
        assert_eq!(key_action("x"), None);
    }
}
