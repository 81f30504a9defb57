//! Column catalog: the ordered set of displayable/exportable columns.
//!
//! The catalog is data, not code. [`ColumnCatalog::default`] carries the
//! columns of the `portarias_iphan` table; a config file can replace it
//! wholesale when the table schema changes.

use serde::{Deserialize, Serialize};

/// Id of the synthetic status column. It has no backing field; its cells
/// are computed by the status engine.
pub const STATUS_COLUMN_ID: &str = "status_portaria";

/// Header used for the status column.
pub const STATUS_COLUMN_NAME: &str = "Status";

/// Placeholder for absent or empty cells.
pub const MISSING_VALUE: &str = "N/A";

/// Columns whose values are URLs.
pub const LINK_COLUMNS: &[&str] = &[
    "link_portaria_dou",
    "ultimo_link_retificado_dou",
    "link_revogado_dou",
];

/// Columns shown when the user has not chosen any.
pub const DEFAULT_SELECTED: &[&str] = &[
    STATUS_COLUMN_ID,
    "portaria",
    "data_publicacao_dou",
    "tipo",
    "regimento_normativo",
    "processo",
    "arqueologos_coordenadores",
    "arqueologos_campo",
    "prazo_validade",
    "data_expiracao",
    "link_portaria_dou",
];

const DEFAULT_COLUMNS: &[(&str, &str)] = &[
    ("portaria", "Portaria"),
    ("data_publicacao_dou", "Data de Publicação no DOU"),
    ("anexo", "Anexo"),
    ("n_autorizacao", "Nº da Autorização"),
    ("tipo", "Tipo"),
    ("regimento_normativo", "Regimento Normativo"),
    ("retificado", "Portaria Retificada?"),
    ("processo", "Nº do Processo"),
    ("enquadramento_in", "Enquadramento IN"),
    ("empreendedor", "Empreendedor"),
    ("empreendimento", "Empreendimento"),
    ("projeto", "Nome do Projeto"),
    ("arqueologos_coordenadores", "Arqueólogos Coordenadores"),
    ("arqueologos_campo", "Arqueólogos de Campo"),
    ("apoio_institucional", "Apoio Institucional"),
    ("municipios_abrangencias", "Municípios"),
    ("estados_abrangencias", "Estados"),
    ("prazo_validade", "Prazo de Validade da Portaria"),
    ("data_expiracao", "Data de Expiração da Portaria"),
    ("link_portaria_dou", "Link da Portaria Publicada no DOU"),
    (
        "quantidade_retificado_dou",
        "Quantidade de Retificações da Portaria no DOU",
    ),
    (
        "ultimo_link_retificado_dou",
        "Última Retificação da Portaria Publicada no DOU",
    ),
    ("link_revogado_dou", "Link da Portaria Revogada no DOU"),
];

/// A catalog column: table column id plus display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Column {
    pub id: String,
    pub name: String,
}

impl Column {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// A column in output order: either the computed status or a catalog column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputColumn<'a> {
    Status,
    Field(&'a Column),
}

impl OutputColumn<'_> {
    pub fn id(&self) -> &str {
        match self {
            OutputColumn::Status => STATUS_COLUMN_ID,
            OutputColumn::Field(c) => &c.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            OutputColumn::Status => STATUS_COLUMN_NAME,
            OutputColumn::Field(c) => &c.name,
        }
    }
}

/// Ordered list of known columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnCatalog {
    columns: Vec<Column>,
}

impl Default for ColumnCatalog {
    fn default() -> Self {
        Self::new(
            DEFAULT_COLUMNS
                .iter()
                .map(|(id, name)| Column::new(*id, *name))
                .collect(),
        )
    }
}

impl ColumnCatalog {
    /// Build a catalog from columns in canonical order. The status column is
    /// always implicit and is dropped if listed.
    pub fn new(columns: Vec<Column>) -> Self {
        let columns = columns
            .into_iter()
            .filter(|c| c.id != STATUS_COLUMN_ID)
            .collect();
        Self { columns }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn get(&self, id: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.id == id)
    }

    /// Whether `id` names a catalog column or the status column.
    pub fn is_known(&self, id: &str) -> bool {
        id == STATUS_COLUMN_ID || self.get(id).is_some()
    }

    /// Arrange a selection into output order.
    ///
    /// Status comes first when selected; the remaining columns follow the
    /// catalog's order regardless of the order they were selected in.
    /// Unknown ids are ignored.
    pub fn arrange<S: AsRef<str>>(&self, selected: &[S]) -> Vec<OutputColumn<'_>> {
        let is_selected = |id: &str| selected.iter().any(|s| s.as_ref() == id);
        let mut out = Vec::with_capacity(selected.len());
        if is_selected(STATUS_COLUMN_ID) {
            out.push(OutputColumn::Status);
        }
        out.extend(
            self.columns
                .iter()
                .filter(|c| is_selected(&c.id))
                .map(OutputColumn::Field),
        );
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_catalog_has_table_columns() {
        let catalog = ColumnCatalog::default();
        assert_eq!(catalog.columns().len(), 23);
        assert_eq!(catalog.columns()[0].id, "portaria");
        assert_eq!(catalog.get("tipo").map(|c| c.name.as_str()), Some("Tipo"));
        assert!(catalog.get(STATUS_COLUMN_ID).is_none());
        assert!(catalog.is_known(STATUS_COLUMN_ID));
    }

    #[test]
    fn arrange_uses_catalog_order_and_status_first() {
        let catalog = ColumnCatalog::default();
        let out = catalog.arrange(&["data_expiracao", "portaria", STATUS_COLUMN_ID, "tipo"]);
        let ids: Vec<&str> = out.iter().map(|c| c.id()).collect();
        assert_eq!(ids, ["status_portaria", "portaria", "tipo", "data_expiracao"]);
        assert_eq!(out[0].name(), "Status");
    }

    #[test]
    fn arrange_ignores_unknown_ids() {
        let catalog = ColumnCatalog::default();
        let out = catalog.arrange(&["nao_existe", "processo"]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id(), "processo");
    }

    #[test]
    fn custom_catalog_drops_listed_status_column() {
        let catalog = ColumnCatalog::new(vec![
            Column::new("b", "B"),
            Column::new(STATUS_COLUMN_ID, "Situação"),
            Column::new("a", "A"),
        ]);
        assert_eq!(catalog.columns().len(), 2);
        let out = catalog.arrange(&["a", "b", STATUS_COLUMN_ID]);
        let ids: Vec<&str> = out.iter().map(|c| c.id()).collect();
        assert_eq!(ids, ["status_portaria", "b", "a"]);
    }
}
