//! Field classification and severity policy
// Copyright 2025 Francisco F. Pinochet
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.


use skyward_audit::Severity;

/// Substrings that mark a record field as sensitive (matched case-insensitively)
pub const SENSITIVE_KEYWORDS: [&str; 9] = [
    "password",
    "secret",
    "key",
    "token",
    "credential",
    "api_key",
    "access_key",
    "private_key",
    "client_secret",
];

/// Whether the field `name` must be encrypted
pub fn is_sensitive_field(name: &str) -> bool {
    let name = name.to_lowercase();
    SENSITIVE_KEYWORDS
        .iter()
        .any(|keyword| name.contains(keyword))
}

/// Severity of a security event.
///
/// Failures are always high; otherwise authentication and authorization
/// events are medium and everything else is low.
pub fn classify_severity(event_type: &str, result: &str) -> Severity {
    match (event_type, result) {
        (_, "failure" | "error") => Severity::High,
        ("authentication" | "authorization", _) => Severity::Medium,
        _ => Severity::Low,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sensitive_fields() {
        for name in [
            "password",
            "DB_PASSWORD",
            "clientSecret",
            "api_key",
            "ApiKey",
            "refresh_token",
            "aws_credentials",
            "monkey",
        ] {
            assert!(is_sensitive_field(name), "{} should be sensitive", name);
        }
        for name in ["username", "note", "region", "instance_id", ""] {
            assert!(!is_sensitive_field(name), "{} should not be sensitive", name);
        }
    }

    #[test]
    fn test_failures_are_high() {
        assert_eq!(classify_severity("authentication", "failure"), Severity::High);
        assert_eq!(classify_severity("data_access", "error"), Severity::High);
        assert_eq!(classify_severity("anything", "failure"), Severity::High);
    }

    #[test]
    fn test_access_control_is_medium() {
        assert_eq!(classify_severity("authentication", "success"), Severity::Medium);
        assert_eq!(classify_severity("authorization", "denied"), Severity::Medium);
    }

    #[test]
    fn test_everything_else_is_low() {
        assert_eq!(classify_severity("data_access", "success"), Severity::Low);
        assert_eq!(classify_severity("configuration_change", "success"), Severity::Low);
        assert_eq!(classify_severity("key_management", "success"), Severity::Low);
    }
}
