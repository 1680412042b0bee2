use serde::{Deserialize, Serialize};

/// One per-second performance sample taken while a session is active.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesPoint {
    pub second: u64,
    pub wpm: f64,
    pub raw_wpm: f64,
    pub errors: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items_done: Option<u64>,
}

impl SeriesPoint {
    pub fn new(second: u64, wpm: f64, raw_wpm: f64, errors: u64) -> Self {
        Self {
            second,
            wpm,
            raw_wpm,
            errors,
            items_done: None,
        }
    }

    pub fn with_items_done(mut self, items_done: u64) -> Self {
        self.items_done = Some(items_done);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn items_done_omitted_from_json_when_absent() {
        let point = SeriesPoint::new(3, 42.5, 50.0, 1);
        let json = serde_json::to_string(&point).unwrap();
        assert!(!json.contains("itemsDone"));
        assert!(json.contains("\"rawWpm\":50.0"));
    }

    #[test]
    fn items_done_serialized_when_present() {
        let point = SeriesPoint::new(3, 42.5, 50.0, 1).with_items_done(2);
        let json = serde_json::to_string(&point).unwrap();
        assert!(json.contains("\"itemsDone\":2"));
    }
}
