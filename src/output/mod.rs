pub mod formatter;

pub use formatter::{
    format_account_detail, format_criteria, format_json, format_summary, format_tier_table,
    format_tsv, should_use_colors,
};
