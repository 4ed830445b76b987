//! Substring search over a collection, used by the list screens.

use serde::{Deserialize, Serialize};

use crate::farm_model::{Animal, HealthRecord, ProductionRecord, User};

/// What an empty search term means for a given screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EmptyTerm {
    /// Nothing is listed until the user searches.
    #[default]
    HideAll,
    /// The whole collection is listed.
    ShowAll,
}

/// Exposes text fields by their wire name for filtering.
pub trait Searchable {
    /// Text of `field`, or `None` if the record has no such field.
    fn field(&self, field: &str) -> Option<&str>;
}

/// Returns the elements whose `field` contains `term`, ignoring case, in source order.
///
/// Elements lacking `field` never match.
pub fn filter<'a, T: Searchable>(
    items: &'a [T],
    field: &str,
    term: &str,
    empty: EmptyTerm,
) -> Vec<&'a T> {
    if term.is_empty() {
        return match empty {
            EmptyTerm::HideAll => Vec::new(),
            EmptyTerm::ShowAll => items.iter().collect(),
        };
    }

    let needle = term.to_lowercase();
    items
        .iter()
        .filter(|item| {
            item.field(field)
                .is_some_and(|value| value.to_lowercase().contains(&needle))
        })
        .collect()
}

impl Searchable for User {
    fn field(&self, field: &str) -> Option<&str> {
        match field {
            "nomeCompleto" => Some(self.nome_completo.as_str()),
            "nomeUsuario" => Some(self.nome_usuario.as_str()),
            "email" => Some(self.email.as_str()),
            "cpf" => Some(self.cpf.as_str()),
            "dataNascimento" => Some(self.data_nascimento.as_str()),
            "endereco" => Some(self.endereco.as_str()),
            // passwords are never searchable
            _ => None,
        }
    }
}

impl Searchable for Animal {
    fn field(&self, field: &str) -> Option<&str> {
        match field {
            "codigoBrinco" => self.codigo_brinco.as_deref(),
            "nome" => self.nome.as_deref(),
            "raca" => Some(self.raca.as_str()),
            "sexo" => Some(self.sexo.as_str()),
            "peso" => self.peso.as_deref(),
            "idade" => self.idade.as_deref(),
            "dataNascimento" => self.data_nascimento.as_deref(),
            _ => None,
        }
    }
}

impl Searchable for HealthRecord {
    fn field(&self, field: &str) -> Option<&str> {
        match self {
            HealthRecord::Checkup(c) => match field {
                "veterinario" => Some(c.veterinario.as_str()),
                "status" => Some(c.status.as_str()),
                "apetite" => Some(c.apetite.as_str()),
                "temperatura" => Some(c.temperatura.as_str()),
                "dataVerificacao" => Some(c.data_verificacao.as_str()),
                _ => None,
            },
            HealthRecord::Vaccination(v) => match field {
                "vacina" => Some(v.vacina.as_str()),
                "dataVacina" => Some(v.data_vacina.as_str()),
                "tratamento" => v.tratamento.as_deref(),
                "observacoes" => v.observacoes.as_deref(),
                _ => None,
            },
        }
    }
}

impl Searchable for ProductionRecord {
    fn field(&self, field: &str) -> Option<&str> {
        match self {
            ProductionRecord::Daily(d) => match field {
                "leite" => d.leite.as_deref(),
                "ganhoPeso" => Some(d.ganho_peso.as_str()),
                "dataProducao" => Some(d.data_producao.as_str()),
                "tipoAnimal" => Some(d.tipo_animal.as_str()),
                _ => None,
            },
            ProductionRecord::Output(o) => match field {
                "tipoProducao" => Some(o.tipo_producao.as_str()),
                "quantidadeProduzida" => Some(o.quantidade_produzida.as_str()),
                "data" => Some(o.data.as_str()),
                _ => None,
            },
        }
    }
}
