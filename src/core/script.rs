//! Line-oriented builder for FLAC3D FISH scripts.

use crate::domain::enums::{OptionSet, OutputFormat};
use crate::utils::text::sanitize_text;

const SECTION_RULE: &str = ";==============================";
const SUBHEADING_RULE: &str = ";--------------------";

/// Collects script lines. Every value line has the form `fish set @<Key>= <value>`.
pub struct ScriptBuilder {
    format: OutputFormat,
    lines: Vec<String>,
}

impl ScriptBuilder {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            lines: Vec::new(),
        }
    }

    pub fn comment(&mut self, text: &str) {
        self.lines.push(format!("; {}", sanitize_text(text)));
    }

    /// Blank separator; dropped in compact output.
    pub fn newline(&mut self) {
        if self.format == OutputFormat::Standard {
            self.lines.push(String::new());
        }
    }

    pub fn section_header(&mut self, title: &str) {
        match self.format {
            OutputFormat::Standard => {
                self.lines.push(SECTION_RULE.to_string());
                self.lines.push(format!(";==== {}", title));
                self.lines.push(SECTION_RULE.to_string());
                self.lines.push(String::new());
            }
            OutputFormat::Compact => self.lines.push(format!(";==== {}", title)),
        }
    }

    pub fn subheading(&mut self, title: &str) {
        match self.format {
            OutputFormat::Standard => {
                self.lines.push(SUBHEADING_RULE.to_string());
                self.lines.push(format!(";-- {}", title));
                self.lines.push(SUBHEADING_RULE.to_string());
            }
            OutputFormat::Compact => self.lines.push(format!(";-- {}", title)),
        }
    }

    fn set(&mut self, key: &str, value: &str) {
        self.lines.push(format!("fish set @{}= {}", key, value));
    }

    /// Single-quoted string; the value is sanitized first.
    pub fn set_text(&mut self, key: &str, value: &str) {
        self.set(key, &format!("'{}'", sanitize_text(value)));
    }

    pub fn set_bool(&mut self, key: &str, value: bool) {
        self.set(key, if value { "yes" } else { "no" });
    }

    /// `f64`'s `Display` never uses an exponent, so the value is plain decimal.
    pub fn set_number(&mut self, key: &str, value: f64) {
        self.set(key, &value.to_string());
    }

    pub fn set_integer(&mut self, key: &str, value: impl Into<u64>) {
        self.set(key, &value.into().to_string());
    }

    /// An option value, written as its quoted label.
    pub fn set_option<E: OptionSet>(&mut self, key: &str, value: E) {
        self.set_text(key, value.label());
    }

    /// An option value, written as its 1-based position in the option set.
    pub fn set_option_index<E: OptionSet>(&mut self, key: &str, value: E) {
        self.set(key, &value.numeric_value().to_string());
    }

    pub fn build(self) -> String {
        let mut out = self.lines.join("\n");
        out.push('\n');
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::enums::DensificationLevel;

    #[test]
    fn test_value_lines() {
        let mut script = ScriptBuilder::new(OutputFormat::Standard);
        script.set_text("Project_Name", "O'Neil; pit");
        script.set_bool("Include_Stoping", true);
        script.set_number("Depth", 50.0);
        script.set_number("Ratio", 0.000015);
        script.set_integer("Target_Zones", 2_000_000_u64);
        script.set_option("Densification", DensificationLevel::Minimum);
        script.set_option_index("Densification_Level", DensificationLevel::Minimum);

        assert_eq!(
            script.build(),
            "fish set @Project_Name= 'ONeil pit'\n\
             fish set @Include_Stoping= yes\n\
             fish set @Depth= 50\n\
             fish set @Ratio= 0.000015\n\
             fish set @Target_Zones= 2000000\n\
             fish set @Densification= 'Minimum Densification'\n\
             fish set @Densification_Level= 2\n"
        );
    }

    #[test]
    fn test_standard_headers() {
        let mut script = ScriptBuilder::new(OutputFormat::Standard);
        script.section_header("Global Settings");
        script.subheading("Octree");
        script.newline();

        assert_eq!(
            script.build(),
            ";==============================\n\
             ;==== Global Settings\n\
             ;==============================\n\
             \n\
             ;--------------------\n\
             ;-- Octree\n\
             ;--------------------\n\
             \n"
        );
    }

    #[test]
    fn test_compact_headers() {
        let mut script = ScriptBuilder::new(OutputFormat::Compact);
        script.section_header("Global Settings");
        script.newline();
        script.subheading("Octree");
        script.comment("note");

        assert_eq!(script.build(), ";==== Global Settings\n;-- Octree\n; note\n");
    }
}
