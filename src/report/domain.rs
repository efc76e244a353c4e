//! Source domain extraction

use std::net::IpAddr;

use url::Url;

/// Suffix labels that sit between the registrable name and the TLD,
/// e.g. the `co` in `bbc.co.uk`.
const SECOND_LEVEL_SUFFIXES: &[&str] = &["ac", "co", "com", "edu", "gov", "net", "org"];

/// Extract the registrable domain label from a link,
/// e.g. `https://www.twitter.com/x/status/1` -> `twitter`.
///
/// Returns `None` for unparseable links and bare IP hosts.
pub fn source_label(link: &str) -> Option<String> {
    let url = Url::parse(link).ok()?;
    let host = url.host_str()?;
    if host.parse::<IpAddr>().is_ok() {
        return None;
    }

    let labels: Vec<&str> = host.split('.').filter(|l| !l.is_empty()).collect();
    let label = match labels.len() {
        0 => return None,
        1 => labels[0],
        2 => labels[0],
        n => {
            if SECOND_LEVEL_SUFFIXES.contains(&labels[n - 2]) {
                labels[n - 3]
            } else {
                labels[n - 2]
            }
        }
    };
    Some(label.to_ascii_lowercase())
}
