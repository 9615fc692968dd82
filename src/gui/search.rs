//! Search form state

use crate::SearchOptions;

/// What the user typed and ticked; read when Search is triggered
pub struct SearchForm {
    /// Current search term
    pub query: String,
    /// locate switches
    pub options: SearchOptions,
    /// First frame flag (for auto-focus)
    pub first_frame: bool,
}

impl Default for SearchForm {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchForm {
    pub fn new() -> Self {
        Self {
            query: String::new(),
            options: SearchOptions::default(),
            first_frame: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checkbox_defaults() {
        let form = SearchForm::new();
        assert!(form.options.ignore_case);
        assert!(form.options.existing_only);
        assert!(!form.options.basename_only);
        assert!(form.first_frame);
        assert!(form.query.is_empty());
    }
}
