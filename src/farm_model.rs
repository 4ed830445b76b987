//! Record types stored by the farm app.
//!
//! Field names on the wire are the camelCase names the mobile forms submit
//! (`codigoBrinco`, `dataVacina`, ...). Numeric inputs are kept as the text
//! the user typed; [`crate::validation`] decides whether that text is an
//! acceptable number. Unknown fields are ignored when decoding and missing
//! ones fall back to empty values so older blobs keep loading.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::app_response::AppResponse;

/// The four top-level lists owned by the record store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Collection {
    Users,
    Animals,
    HealthRecords,
    ProductionRecords,
}

impl Collection {
    pub const ALL: [Collection; 4] = [
        Collection::Users,
        Collection::Animals,
        Collection::HealthRecords,
        Collection::ProductionRecords,
    ];

    /// Storage key of the collection's blob.
    pub fn key(self) -> &'static str {
        match self {
            Collection::Users => "users",
            Collection::Animals => "animals",
            Collection::HealthRecords => "healthRecords",
            Collection::ProductionRecords => "productionRecords",
        }
    }
}

impl Display for Collection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Collection {
    type Err = AppResponse;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Collection::ALL
            .into_iter()
            .find(|c| c.key() == s)
            .ok_or_else(|| AppResponse::BadRequest(format!("Unknown collection: {s}")))
    }
}

/// A registered account.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct User {
    pub nome_completo: String,
    pub nome_usuario: String,
    pub senha: String,
    pub email: String,
    pub cpf: String,
    /// DD/MM/YYYY
    pub data_nascimento: String,
    pub endereco: String,
}

/// An animal. Identified by ear tag (`codigoBrinco`) or, in older records, by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Animal {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub codigo_brinco: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nome: Option<String>,
    pub raca: String,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "loose_text")]
    pub peso: Option<String>,
    pub sexo: String,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "loose_text")]
    pub idade: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_nascimento: Option<String>,
}

/// Veterinary check-up.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HealthCheckup {
    pub veterinario: String,
    pub status: String,
    pub apetite: String,
    #[serde(deserialize_with = "loose_text_required")]
    pub temperatura: String,
    pub data_verificacao: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Vaccination {
    pub vacina: String,
    pub data_vacina: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tratamento: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observacoes: Option<String>,
}

/// Health record. The variant is picked from the fields present in the JSON
/// object: anything mentioning `vacina`/`dataVacina` is a vaccination.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum HealthRecord {
    Checkup(HealthCheckup),
    Vaccination(Vaccination),
}

impl<'de> Deserialize<'de> for HealthRecord {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = JsonValue::deserialize(deserializer)?;
        if has_any_field(&value, &["vacina", "dataVacina"]) {
            serde_json::from_value(value)
                .map(HealthRecord::Vaccination)
                .map_err(de::Error::custom)
        } else {
            serde_json::from_value(value)
                .map(HealthRecord::Checkup)
                .map_err(de::Error::custom)
        }
    }
}

/// Daily yield of an animal group: milk and weight gain.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DailyProduction {
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "loose_text")]
    pub leite: Option<String>,
    #[serde(deserialize_with = "loose_text_required")]
    pub ganho_peso: String,
    pub data_producao: String,
    pub tipo_animal: String,
    pub producao_leite: bool,
}

/// Generic production entry: a kind of product and the quantity produced.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductionOutput {
    pub tipo_producao: String,
    #[serde(deserialize_with = "loose_text_required")]
    pub quantidade_produzida: String,
    pub data: String,
}

/// Production record. Objects carrying `tipoProducao` or
/// `quantidadeProduzida` decode as [`ProductionOutput`], everything else as
/// [`DailyProduction`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ProductionRecord {
    Daily(DailyProduction),
    Output(ProductionOutput),
}

impl<'de> Deserialize<'de> for ProductionRecord {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = JsonValue::deserialize(deserializer)?;
        if has_any_field(&value, &["tipoProducao", "quantidadeProduzida"]) {
            serde_json::from_value(value)
                .map(ProductionRecord::Output)
                .map_err(de::Error::custom)
        } else {
            serde_json::from_value(value)
                .map(ProductionRecord::Daily)
                .map_err(de::Error::custom)
        }
    }
}

/// A record of any kind, tagged with the collection it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub enum FarmRecord {
    User(User),
    Animal(Animal),
    Health(HealthRecord),
    Production(ProductionRecord),
}

impl FarmRecord {
    pub fn collection(&self) -> Collection {
        match self {
            FarmRecord::User(_) => Collection::Users,
            FarmRecord::Animal(_) => Collection::Animals,
            FarmRecord::Health(_) => Collection::HealthRecords,
            FarmRecord::Production(_) => Collection::ProductionRecords,
        }
    }

    /// Decodes `json` as a record of `collection`.
    pub fn from_json(collection: Collection, json: &str) -> Result<Self, AppResponse> {
        let record = match collection {
            Collection::Users => FarmRecord::User(serde_json::from_str(json)?),
            Collection::Animals => FarmRecord::Animal(serde_json::from_str(json)?),
            Collection::HealthRecords => FarmRecord::Health(serde_json::from_str(json)?),
            Collection::ProductionRecords => FarmRecord::Production(serde_json::from_str(json)?),
        };
        Ok(record)
    }

    pub fn to_json(&self) -> Result<String, AppResponse> {
        let json = match self {
            FarmRecord::User(user) => serde_json::to_string(user)?,
            FarmRecord::Animal(animal) => serde_json::to_string(animal)?,
            FarmRecord::Health(record) => serde_json::to_string(record)?,
            FarmRecord::Production(record) => serde_json::to_string(record)?,
        };
        Ok(json)
    }
}

fn has_any_field(value: &JsonValue, fields: &[&str]) -> bool {
    value
        .as_object()
        .map(|map| fields.iter().any(|f| map.contains_key(*f)))
        .unwrap_or(false)
}

/// Accepts a JSON string, number or boolean and keeps its text.
fn loose_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<JsonValue>::deserialize(deserializer)? {
        None | Some(JsonValue::Null) => Ok(None),
        Some(JsonValue::String(s)) => Ok(Some(s)),
        Some(JsonValue::Number(n)) => Ok(Some(n.to_string())),
        Some(JsonValue::Bool(b)) => Ok(Some(b.to_string())),
        Some(other) => Err(de::Error::custom(format!(
            "expected text or number, found {other}"
        ))),
    }
}

fn loose_text_required<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(loose_text(deserializer)?.unwrap_or_default())
}
