/// Colours used by the upload control
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    pub main: String,
    pub on_main: String,
    pub shadow: String,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            main: "#0066cc".to_string(),
            on_main: "#ffffff".to_string(),
            shadow: "rgba(0, 0, 0, 0.8)".to_string(),
        }
    }
}

impl Theme {
    pub fn container_style(&self) -> String {
        "flex: 1; display: flex; justify-content: center; align-items: center;".to_string()
    }

    pub fn float_button_style(&self) -> String {
        format!(
            "position: absolute; display: flex; align-items: center; justify-content: center; \
             width: 55px; height: 55px; bottom: 10px; right: 20px; border: none; \
             border-radius: 27.5px; background: {}; color: {}; box-shadow: 2px 2px 1px {}; \
             overflow: hidden; padding: 0;",
            self.main, self.on_main, self.shadow
        )
    }

    pub fn normal_button_style(&self) -> String {
        format!(
            "border: none; border-radius: 3px; padding: 10px 8px; background: {}; \
             box-shadow: 2px 2px 1px {};",
            self.main, self.shadow
        )
    }

    pub fn button_text_style(&self) -> String {
        format!("color: {}; font-size: 15px; font-weight: 600;", self.on_main)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_styles_use_theme_colours() {
        let theme = Theme {
            main: "#123456".to_string(),
            ..Theme::default()
        };
        assert!(theme.float_button_style().contains("background: #123456"));
        assert!(theme.normal_button_style().contains("background: #123456"));
        assert!(theme.button_text_style().contains("#ffffff"));
    }
}
