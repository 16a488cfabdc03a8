//! CLI definition for the solr-metadata command-line interface.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Edit which Solr fields are displayed for repository objects.
///
/// Configurations live under `data_dir` (default `.solr-metadata`). The
/// indexed field list comes from a saved Luke response (`luke_file`) or a
/// fixed `index_fields` list; content models come from `content_models_file`
/// or the `content_models` map.
#[derive(Parser, Debug)]
#[command(name = "solr-metadata")]
#[command(version)]
#[command(about = "Edit Solr metadata display configurations")]
#[command(
    long_about = "Edit Solr metadata display configurations.\n\n\
    Settings are read from solr-metadata.{toml,yaml,yml,json} in the working \
    directory (or --config), then from the environment.\n\n\
    Environment variables:\n  \
    SOLR_METADATA_DATA_DIR             Where configurations are stored\n  \
    SOLR_METADATA_LUKE_FILE            Saved Solr Luke JSON response\n  \
    SOLR_METADATA_CONTENT_MODELS_FILE  YAML map of content model id to label"
)]
pub struct Cli {
    /// Enable debug output to stderr
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Read settings from this file instead of the working directory
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List configurations
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Create an empty configuration
    Create {
        /// Configuration name
        name: String,
    },

    /// Show the configuration form
    Show {
        /// Configuration id
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Apply edits to a configuration and optionally save them
    ///
    /// Edits run in a fixed order: content models, fields, labels and
    /// weights, then the description. Without --save the resulting form is
    /// shown and nothing is written.
    Edit(EditArgs),

    /// Delete a configuration with its fields and content models
    Delete {
        /// Configuration id
        id: String,
        /// Skip the confirmation step
        #[arg(long)]
        yes: bool,
    },

    /// Show how the description field truncates the given values
    Preview {
        /// Configuration id
        id: String,
        /// Values of the description field
        #[arg(required = true)]
        values: Vec<String>,
        /// Separator used when the whole field is truncated
        #[arg(long, default_value = ", ")]
        separator: String,
    },
}

#[derive(Args, Debug, Default)]
pub struct EditArgs {
    /// Configuration id
    pub id: String,

    /// Associate a content model
    #[arg(long = "add-cmodel", value_name = "PID")]
    pub add_cmodels: Vec<String>,

    /// Drop a content model association
    #[arg(long = "remove-cmodel", value_name = "PID")]
    pub remove_cmodels: Vec<String>,

    /// Add a Solr field to the display table
    #[arg(long = "add-field", value_name = "FIELD")]
    pub add_fields: Vec<String>,

    /// Remove a Solr field from the display table
    #[arg(long = "remove-field", value_name = "FIELD")]
    pub remove_fields: Vec<String>,

    /// Set the display label of a field
    #[arg(long = "label", value_name = "FIELD=LABEL", value_parser = parse_assignment::<String>)]
    pub labels: Vec<(String, String)>,

    /// Set the weight of a field
    #[arg(long = "weight", value_name = "FIELD=N", value_parser = parse_assignment::<i32>)]
    pub weights: Vec<(String, i32)>,

    /// Solr field used as the description (empty to clear)
    #[arg(long)]
    pub description_field: Option<String>,

    /// Label shown for the description
    #[arg(long)]
    pub description_label: Option<String>,

    /// separate_value_option or whole_field_option
    #[arg(long)]
    pub truncation_type: Option<String>,

    /// Maximum description length in characters (0 disables truncation)
    #[arg(long)]
    pub max_length: Option<usize>,

    /// Only cut at word boundaries
    #[arg(long)]
    pub word_safe: Option<bool>,

    /// Append an ellipsis when text is cut
    #[arg(long)]
    pub ellipsis: Option<bool>,

    /// Shortest text a word-safe cut may leave
    #[arg(long)]
    pub min_wordsafe_length: Option<usize>,

    /// Write the edited configuration
    #[arg(long)]
    pub save: bool,
}

impl EditArgs {
    /// Whether any description input was given
    pub fn touches_description(&self) -> bool {
        self.description_field.is_some()
            || self.description_label.is_some()
            || self.truncation_type.is_some()
            || self.max_length.is_some()
            || self.word_safe.is_some()
            || self.ellipsis.is_some()
            || self.min_wordsafe_length.is_some()
    }
}

fn parse_assignment<T>(s: &str) -> Result<(String, T), String>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected FIELD=VALUE, got '{s}'"))?;
    let value = value
        .parse()
        .map_err(|e| format!("invalid value for {key}: {e}"))?;
    Ok((key.to_string(), value))
}
