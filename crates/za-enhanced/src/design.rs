//! Table designs for `CREATETABLE`.

use serde::{Deserialize, Serialize};

/// A table design, serialized with Zoho's upper-case keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDesign {
    #[serde(rename = "TABLENAME")]
    pub table_name: String,
    #[serde(rename = "TABLEDESCRIPTION", default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "FOLDERNAME", default, skip_serializing_if = "Option::is_none")]
    pub folder_name: Option<String>,
    #[serde(rename = "COLUMNS")]
    pub columns: Vec<ColumnDesign>,
}

/// One column of a [`TableDesign`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDesign {
    #[serde(rename = "COLUMNNAME")]
    pub column_name: String,
    /// Zoho data type: `PLAIN`, `NUMBER`, `DATE`, `CURRENCY` and so on.
    #[serde(rename = "DATATYPE")]
    pub data_type: String,
    #[serde(rename = "DESCRIPTION", default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// `Yes` or `No`.
    #[serde(rename = "MANDATORY", default, skip_serializing_if = "Option::is_none")]
    pub mandatory: Option<String>,
}

impl TableDesign {
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            description: None,
            folder_name: None,
            columns: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_folder(mut self, folder_name: impl Into<String>) -> Self {
        self.folder_name = Some(folder_name.into());
        self
    }

    /// Append a column.
    pub fn column(mut self, name: impl Into<String>, data_type: impl Into<String>) -> Self {
        self.columns.push(ColumnDesign::new(name, data_type));
        self
    }

    /// Split into a design holding the first `threshold` columns and the
    /// columns left over.
    pub fn split_at(&self, threshold: usize) -> (TableDesign, &[ColumnDesign]) {
        let split = threshold.min(self.columns.len());
        let (head, rest) = self.columns.split_at(split);
        let design = TableDesign {
            columns: head.to_vec(),
            ..self.clone_without_columns()
        };
        (design, rest)
    }

    fn clone_without_columns(&self) -> TableDesign {
        TableDesign {
            table_name: self.table_name.clone(),
            description: self.description.clone(),
            folder_name: self.folder_name.clone(),
            columns: Vec::new(),
        }
    }
}

impl ColumnDesign {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            column_name: name.into(),
            data_type: data_type.into(),
            description: None,
            mandatory: None,
        }
    }
}
