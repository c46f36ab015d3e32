use trendstitch_core::StitchError;

/// Collapse the provider errors collected for one window.
///
/// Rules:
/// - If `attempted_any` is false → `NoProviders`.
/// - A single error is returned unchanged.
/// - Else → `AllProvidersFailed(errors)`.
pub fn collapse_errors(attempted_any: bool, mut errors: Vec<StitchError>) -> StitchError {
    if !attempted_any {
        return StitchError::NoProviders("no available provider for window".into());
    }
    if errors.len() == 1 {
        return errors.remove(0);
    }
    StitchError::AllProvidersFailed(errors)
}
