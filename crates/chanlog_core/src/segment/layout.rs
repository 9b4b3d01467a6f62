//! Preamble and footer markup.

use crate::render::escape_html;
use chrono::{FixedOffset, NaiveDate};

/// Stylesheet used when no extra `<head>` markup is configured.
pub const DEFAULT_STYLESHEET: &str = r#"    <style type="text/css">
      body {
        background: white;
        color: black;
        font: 0.9em "Droid Sans Mono", "DejaVu Sans Mono", "Bitstream Vera Sans Mono",
              "Liberation Mono", "Nimbus Mono L", Monaco, Consolas, "Lucida Console",
              "Lucida Sans Typewriter", "Courier New", monospace;
      }
      .chattable {
        border-collapse: collapse;
      }
      .msgnick {
        border-style: solid;
        border-color: #999;
        border-width: 0 1px;
        padding: 0 8px;
      }
      .msgtime {
        padding-right: 8px;
      }
      .msgtime a {
        text-decoration:none;
      }
      .msgmessage {
        padding-left: 8px;
        white-space: pre-wrap;
      }
      .msgaction {
        padding-left: 8px;
        font-style: italic;
      }
      .msgtopic {
        padding-left: 8px;
        font-weight: bold;
        font-style: italic;
        color: #920002;
      }
      .msgnickchange {
        padding-left: 8px;
        font-weight: bold;
        font-style: italic;
        color: #820002;
      }
      .msgmode {
        padding-left: 8px;
        font-weight: bold;
        font-style: italic;
        color: #920002;
      }
      .msgjoin {
        padding-left: 8px;
        font-style: italic;
        color: green;
      }
      .msgleave {
        padding-left: 8px;
        font-style: italic;
        color: red;
      }
    </style>"#;

const FOOTER: &str = "    </table>\n  </body>\n</html>\n";

/// Returns true if `contents` ends with a segment footer.
#[must_use]
pub fn is_finalized(contents: &str) -> bool {
    contents.trim_end().ends_with(FOOTER.trim_end())
}

/// Everything needed to write a segment's fixed markup.
#[derive(Debug, Clone)]
pub struct SegmentFormat {
    /// Channel label for the title.
    pub title: String,
    /// File extension of sibling segments, without the dot.
    pub extension: String,
    /// Raw markup placed inside `<head>`.
    pub extra_head: String,
}

impl Default for SegmentFormat {
    fn default() -> Self {
        Self {
            title: "#chanlog".to_string(),
            extension: "html".to_string(),
            extra_head: DEFAULT_STYLESHEET.to_string(),
        }
    }
}

impl SegmentFormat {
    /// File name of the segment for `date`.
    #[must_use]
    pub fn file_name(&self, date: NaiveDate) -> String {
        format!("{}.{}", date.format("%Y-%m-%d"), self.extension)
    }

    /// Document head up to and including the opening `<table>`.
    ///
    /// `offset` is the UTC offset disclosed as the zone of the time column.
    #[must_use]
    pub fn preamble(&self, date: NaiveDate, offset: FixedOffset) -> String {
        let title = escape_html(&self.title);
        let day = date.format("%Y-%m-%d");
        let prev = date
            .pred_opt()
            .map_or_else(String::new, |d| self.file_name(d));
        let next = date
            .succ_opt()
            .map_or_else(String::new, |d| self.file_name(d));

        format!(
            concat!(
                "<!DOCTYPE HTML>\n",
                "<html>\n",
                "  <head>\n",
                "    <title>{title} IRC logs, {day}</title>\n",
                "    <meta charset=\"utf-8\"/>\n",
                "{extra_head}\n",
                "  </head>\n",
                "  <body>\n",
                "    <h1>{title} IRC logs, {day}</h1>\n",
                "    <p>\n",
                "      All times are UTC{offset}.\n",
                "      <a href=\"{prev}\">&lt;==</a>\n",
                "      <a href=\"{next}\">==&gt;</a>\n",
                "    </p>\n",
                "    <hr/>\n",
                "    <table class=\"chattable\">\n",
            ),
            title = title,
            day = day,
            extra_head = self.extra_head,
            offset = offset,
            prev = prev,
            next = next,
        )
    }

    /// Closing markup written when the segment is finalized.
    #[must_use]
    pub const fn footer(&self) -> &'static str {
        FOOTER
    }
}
