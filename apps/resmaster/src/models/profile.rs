use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub email: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub street: Option<String>,
    pub links: Vec<String>,
}

impl ContactInfo {
    /// Single-line rendering, ` | `-separated, skipping absent parts.
    pub fn line(&self) -> String {
        let mut parts: Vec<&str> = Vec::new();
        if let Some(e) = &self.email {
            parts.push(e);
        }
        if let Some(p) = &self.phone {
            parts.push(p);
        }
        if let Some(s) = &self.street {
            parts.push(s);
        }
        if let Some(l) = &self.location {
            parts.push(l);
        }
        parts.extend(self.links.iter().map(String::as_str));
        parts.join(" | ")
    }

    pub fn is_empty(&self) -> bool {
        self.email.is_none()
            && self.phone.is_none()
            && self.location.is_none()
            && self.street.is_none()
            && self.links.is_empty()
    }
}

/// One role in the candidate's work history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub title: String,
    pub company: String,
    pub dates: String,
    pub bullets: Vec<String>,
}

impl HistoryEntry {
    pub fn header(&self) -> String {
        let mut head = self.title.clone();
        if !self.company.is_empty() {
            if !head.is_empty() {
                head.push_str(" — ");
            }
            head.push_str(&self.company);
        }
        if !self.dates.is_empty() {
            head.push_str(&format!(" ({})", self.dates));
        }
        head
    }
}

/// Structured fields pulled from a resume. Produced once per pair, read-only afterward.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedProfile {
    pub name: String,
    pub contact: ContactInfo,
    pub summary: Option<String>,
    pub history: Vec<HistoryEntry>,
    pub skills: Vec<String>,
    pub education: Vec<String>,
    pub certifications: Vec<String>,
    pub publications: Vec<String>,
    pub projects: Vec<String>,
    pub awards: Vec<String>,
    /// Normalized source text, kept for scoring and the redline.
    pub raw_text: String,
}

impl ExtractedProfile {
    pub fn all_bullets(&self) -> impl Iterator<Item = &String> {
        self.history.iter().flat_map(|h| h.bullets.iter())
    }
}

/// `(first, last)` split used for file naming. Middle names are dropped.
pub fn split_name(name: &str) -> (String, String) {
    let mut words = name.split_whitespace();
    let first = words.next().unwrap_or_default().to_string();
    let last = words.last().unwrap_or_default().to_string();
    (first, last)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contact_line_skips_missing_parts() {
        let c = ContactInfo {
            email: Some("jane@example.com".into()),
            location: Some("Denver, CO".into()),
            ..Default::default()
        };
        assert_eq!(c.line(), "jane@example.com | Denver, CO");
    }

    #[test]
    fn test_history_header_formats() {
        let h = HistoryEntry {
            title: "Lead Technician".into(),
            company: "RiverWorks".into(),
            dates: "2020–Present".into(),
            bullets: vec![],
        };
        assert_eq!(h.header(), "Lead Technician — RiverWorks (2020–Present)");

        let untitled = HistoryEntry {
            company: "Acme".into(),
            ..Default::default()
        };
        assert_eq!(untitled.header(), "Acme");
    }

    #[test]
    fn test_split_name_drops_middle_initial() {
        assert_eq!(split_name("Jane Q. Doe"), ("Jane".to_string(), "Doe".to_string()));
        assert_eq!(split_name("Cher"), ("Cher".to_string(), String::new()));
        assert_eq!(split_name(""), (String::new(), String::new()));
    }
}
