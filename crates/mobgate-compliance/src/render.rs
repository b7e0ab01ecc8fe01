use crate::masvs::ControlViolation;

/// Renders failed controls as human-readable blocks, one per control.
///
/// ```text
/// - MASVS-STORAGE-1
///   Description: Sensitive data stored unencrypted
///   Guidance: Use the platform keystore
/// ```
pub fn render_failures<'a, I>(failures: I) -> String
where
    I: IntoIterator<Item = &'a ControlViolation>,
{
    failures
        .into_iter()
        .map(|v| {
            format!(
                "- {}\n  Description: {}\n  Guidance: {}",
                v.requirement(),
                v.description(),
                v.guidance()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
