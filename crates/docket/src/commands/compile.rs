//! `docket compile` command implementation.

use std::path::PathBuf;

use clap::Args;
use docket_compiler::{CompilationParameters, DocVersion, Language, SourceFile};

use super::{ConfigArgs, create_compiler};
use crate::error::CliError;
use crate::output::Output;
use crate::sidecar::load_entry;

/// Arguments for the compile command.
#[derive(Args)]
pub(crate) struct CompileArgs {
    /// Source file to compile.
    file: PathBuf,

    /// Documentation version the file belongs to.
    #[arg(long)]
    doc_version: String,

    /// Client language the page is compiled for.
    #[arg(short, long, default_value = "csharp")]
    language: String,

    /// Version legacy code references point at (default: --doc-version).
    #[arg(long)]
    source_version: Option<String>,

    #[command(flatten)]
    config: ConfigArgs,
}

impl CompileArgs {
    /// Execute the compile command.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let config = self.config.load()?;
        let compiler = create_compiler(&config)?;

        let file = std::path::absolute(&self.file)?;
        let language = Language::new(&self.language);
        let entry = load_entry(&file, &language)?;
        let version = DocVersion::new(self.doc_version);
        let source_version = self
            .source_version
            .map_or_else(|| version.clone(), DocVersion::new);

        let params = CompilationParameters::new(SourceFile::new(file), entry.folder_item, version)
            .with_source_version(source_version)
            .with_mappings(entry.mappings);
        let page = compiler.compile(params)?;

        output.page(&serde_json::to_string_pretty(&page)?)?;
        Ok(())
    }
}
