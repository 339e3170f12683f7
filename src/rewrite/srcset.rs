/// One candidate of an `srcset` attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SrcsetCandidate<'a> {
    /// The image reference
    pub url: &'a str,
    /// Width/density descriptor with its leading whitespace, e.g. `" 2x"`
    pub descriptor: &'a str,
}

/// Splits an `srcset` value into its candidates
///
/// Candidates are separated by commas; empty candidates are dropped. The
/// descriptor keeps its exact text so it can be re-emitted unchanged.
pub fn parse_srcset(value: &str) -> Vec<SrcsetCandidate<'_>> {
    value
        .split(',')
        .map(str::trim)
        .filter(|candidate| !candidate.is_empty())
        .map(|candidate| match candidate.find(char::is_whitespace) {
            Some(end) => SrcsetCandidate {
                url: &candidate[..end],
                descriptor: &candidate[end..],
            },
            None => SrcsetCandidate {
                url: candidate,
                descriptor: "",
            },
        })
        .collect()
}
