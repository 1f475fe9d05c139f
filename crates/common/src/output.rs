//! Scanning of provisioner text output

use once_cell::sync::Lazy;
use regex::Regex;

/// `public_ip: "a.b.c.d"` as printed in the Outputs section of `pulumi up`.
/// Octets are matched as 1-3 digits and not range-checked.
static PUBLIC_IP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"public_ip:\s*"?(?P<ip>(?:\d{1,3}\.){3}\d{1,3})"?"#)
        .expect("public_ip pattern is valid")
});

/// Return the first public IP address found in `text`, if any
pub fn extract_ip(text: &str) -> Option<&str> {
    PUBLIC_IP
        .captures(text)
        .and_then(|caps| caps.name("ip"))
        .map(|m| m.as_str())
}
