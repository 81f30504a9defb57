//! The authorization record as served by the `portarias_iphan` table.
//!
//! Field names follow the table's column ids. Every text column is decoded
//! leniently: the backend has served the same column as a string in one
//! revision and as a number in another, so strings, numbers and booleans are
//! all accepted as text and `null` becomes `None`. Columns the struct does not
//! name are kept in [`Record::extra`].

use std::borrow::Cow;
use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::dates::split_br_date;

/// One authorization entry ("portaria").
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Primary key. Only used for ordering and cursoring.
    pub id: i64,
    #[serde(default, deserialize_with = "lenient_text")]
    pub portaria: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub ano: Option<String>,
    /// Publication date in the official gazette (DOU), `dd/mm/yyyy`.
    #[serde(default, deserialize_with = "lenient_text")]
    pub data_publicacao_dou: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub anexo: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub n_autorizacao: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub tipo: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub regimento_normativo: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub retificado: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub processo: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub enquadramento_in: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub empreendedor: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub empreendimento: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub projeto: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub arqueologos_coordenadores: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub arqueologos_campo: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub apoio_institucional: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub municipios_abrangencias: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub estados_abrangencias: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub prazo_validade: Option<String>,
    /// Expiration date, `dd/mm/yyyy`. May be empty or malformed.
    #[serde(default, deserialize_with = "lenient_text")]
    pub data_expiracao: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub link_portaria_dou: Option<String>,
    /// Number of rectifications published for this portaria.
    #[serde(default, deserialize_with = "lenient_text")]
    pub quantidade_retificado_dou: Option<String>,
    /// Latest rectification link(s), possibly comma-joined.
    #[serde(default, deserialize_with = "lenient_text")]
    pub ultimo_link_retificado_dou: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub link_revogado_dou: Option<String>,
    /// Last modification time (ISO 8601), used for the "last updated" banner.
    #[serde(default, deserialize_with = "lenient_text")]
    pub updated_at: Option<String>,
    /// Columns not modelled above, keyed by column id.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Record {
    // ── Named accessors used by the status and filter engines ──

    /// Authorization type (`tipo`).
    pub fn kind(&self) -> Option<&str> {
        self.tipo.as_deref()
    }

    /// Portaria title/number (`portaria`).
    pub fn title(&self) -> Option<&str> {
        self.portaria.as_deref()
    }

    /// Regulation the authorization was issued under (`regimento_normativo`).
    pub fn regulation(&self) -> Option<&str> {
        self.regimento_normativo.as_deref()
    }

    pub fn expiration_date(&self) -> Option<&str> {
        self.data_expiracao.as_deref()
    }

    pub fn publication_date(&self) -> Option<&str> {
        self.data_publicacao_dou.as_deref()
    }

    pub fn revocation_link(&self) -> Option<&str> {
        self.link_revogado_dou.as_deref()
    }

    pub fn last_amendment_link(&self) -> Option<&str> {
        self.ultimo_link_retificado_dou.as_deref()
    }

    /// Rectification count, if the column holds something integer-like.
    ///
    /// `"2"`, `" 2 "` and `"2.0"` all read as 2; anything else is `None`.
    pub fn amendment_count(&self) -> Option<i64> {
        let raw = self.quantidade_retificado_dou.as_deref()?.trim();
        if let Ok(n) = raw.parse::<i64>() {
            return Some(n);
        }
        raw.parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .map(|f| f.trunc() as i64)
    }

    /// Year of the authorization.
    ///
    /// Uses `ano` when present, otherwise the year of a well-formed
    /// publication date.
    pub fn year(&self) -> Option<Cow<'_, str>> {
        if let Some(ano) = self.ano.as_deref()
            && !ano.trim().is_empty()
        {
            return Some(Cow::Borrowed(ano));
        }
        let (_, _, year) = split_br_date(self.publication_date()?)?;
        Some(Cow::Owned(year.to_string()))
    }

    /// Raw value of a column by id.
    ///
    /// Modelled columns are returned as stored; unmodelled ones are looked up
    /// in [`extra`](Self::extra) and rendered to text. `None` for null or
    /// unknown columns.
    pub fn field(&self, column_id: &str) -> Option<Cow<'_, str>> {
        let typed = match column_id {
            "id" => return Some(Cow::Owned(self.id.to_string())),
            "portaria" => &self.portaria,
            "ano" => return self.year(),
            "data_publicacao_dou" => &self.data_publicacao_dou,
            "anexo" => &self.anexo,
            "n_autorizacao" => &self.n_autorizacao,
            "tipo" => &self.tipo,
            "regimento_normativo" => &self.regimento_normativo,
            "retificado" => &self.retificado,
            "processo" => &self.processo,
            "enquadramento_in" => &self.enquadramento_in,
            "empreendedor" => &self.empreendedor,
            "empreendimento" => &self.empreendimento,
            "projeto" => &self.projeto,
            "arqueologos_coordenadores" => &self.arqueologos_coordenadores,
            "arqueologos_campo" => &self.arqueologos_campo,
            "apoio_institucional" => &self.apoio_institucional,
            "municipios_abrangencias" => &self.municipios_abrangencias,
            "estados_abrangencias" => &self.estados_abrangencias,
            "prazo_validade" => &self.prazo_validade,
            "data_expiracao" => &self.data_expiracao,
            "link_portaria_dou" => &self.link_portaria_dou,
            "quantidade_retificado_dou" => &self.quantidade_retificado_dou,
            "ultimo_link_retificado_dou" => &self.ultimo_link_retificado_dou,
            "link_revogado_dou" => &self.link_revogado_dou,
            "updated_at" => &self.updated_at,
            other => {
                return self
                    .extra
                    .get(other)
                    .cloned()
                    .and_then(value_to_text)
                    .map(Cow::Owned);
            }
        };
        typed.as_deref().map(Cow::Borrowed)
    }
}

// ── Lenient decoding ──

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(value_to_text))
}

fn value_to_text(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}
