use tracing::{debug, warn};

use crate::domain::RegionId;
use crate::error::ValidationError;
use crate::registry::RegionRegistry;

/// Hard cap on raw region input, applied before normalization.
pub const MAX_REGION_INPUT_LEN: usize = 50;

/// Gate a free-form region string against the registry.
///
/// Normalization: trim, lowercase, strip everything outside `[a-z0-9-]`.
/// Rejects over-long input, input that is empty after normalization, and
/// identifiers not present in the registry. Empty input is a rejection,
/// never a fallback to some default region.
pub fn validate_region(
    input: &str,
    registry: &RegionRegistry,
) -> Result<RegionId, ValidationError> {
    if input.len() > MAX_REGION_INPUT_LEN {
        warn!(len = input.len(), "region input over length cap");
        return Err(ValidationError::TooLong {
            max: MAX_REGION_INPUT_LEN,
        });
    }

    let normalized: String = input
        .trim()
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-')
        .collect();

    if normalized.is_empty() {
        return Err(ValidationError::EmptyRegion);
    }

    if !registry.contains(&normalized) {
        warn!(region = %normalized, "access denied to unknown region");
        return Err(ValidationError::UnknownRegion(normalized));
    }

    debug!(region = %normalized, "access granted");
    Ok(RegionId::new(normalized))
}
