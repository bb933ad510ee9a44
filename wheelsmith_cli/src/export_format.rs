use clap::ValueEnum;

use wheelsmith_rs::config::ExportFormat;

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum ExportFormatValue {
    Csv,
    None,
}

impl ExportFormatValue {
    pub fn to_format(self) -> ExportFormat {
        match self {
            ExportFormatValue::Csv => ExportFormat::Csv,
            ExportFormatValue::None => ExportFormat::None,
        }
    }
}
