//! Field-level acceptance rules applied before a record reaches the store.
//!
//! Every field is checked independently and every violation is reported, so a
//! form can highlight all problems at once. Within a single field the first
//! failing rule wins. A record is either accepted whole or rejected whole.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::farm_model::{
    Animal, DailyProduction, FarmRecord, HealthCheckup, HealthRecord, ProductionOutput,
    ProductionRecord, User, Vaccination,
};

/// Field name -> message, ordered by field name.
pub type Violations = BTreeMap<String, String>;

/// Characters accepted as the "special" class of a password.
pub const PASSWORD_SPECIALS: &str = "@$!%*?#&";

pub const MIN_PASSWORD_LEN: usize = 8;

/// Minimum length for names and ear tags.
pub const MIN_NAME_LEN: usize = 3;

// `\d` is Unicode-aware in `regex`; form input only ever carries ASCII digits.
static DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9]{2}/[0-9]{2}/[0-9]{4}$").expect("valid date regex")
});

static CPF_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9]{3}\.[0-9]{3}\.[0-9]{3}-[0-9]{2}$").expect("valid CPF regex")
});

static PASSWORD_CHARSET_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9@$!%*?#&]{8,}$").expect("valid password charset regex")
});

/// Lowercase, uppercase, digit, special.
static PASSWORD_CLASSES: LazyLock<[Regex; 4]> = LazyLock::new(|| {
    [r"[a-z]", r"[A-Z]", r"[0-9]", r"[@$!%*?#&]"]
        .map(|class| Regex::new(class).expect("valid password class regex"))
});

/// Local part from the HTML e-mail grammar; domain labels of letters, digits
/// and inner hyphens, with at least one dot.
static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+",
        r"@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?",
        r"(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)+$",
    ))
    .expect("valid e-mail regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    Required,
    MinLength(usize),
    Positive,
    Integer,
    Date,
    Email,
    Password,
    Cpf,
}

impl Rule {
    /// Returns the violation message for `value`, if any. `value` is never blank here.
    fn check(self, label: &str, value: &str) -> Option<String> {
        match self {
            Rule::Required => None,
            Rule::MinLength(n) => (value.trim().chars().count() < n)
                .then(|| format!("{label} must have at least {n} characters")),
            Rule::Positive => match parse_number(value) {
                Some(n) if n > 0.0 => None,
                Some(_) => Some(format!("{label} must be a positive number")),
                None => Some(format!("{label} must be a number")),
            },
            Rule::Integer => match parse_number(value) {
                Some(n) if n.fract() == 0.0 => None,
                Some(_) => Some(format!("{label} must be a whole number")),
                None => Some(format!("{label} must be a number")),
            },
            Rule::Date => (!is_date_format(value))
                .then(|| format!("{label} must be in the DD/MM/YYYY format")),
            Rule::Email => (!is_email(value)).then(|| "Invalid e-mail".to_string()),
            Rule::Password => (!is_strong_password(value)).then(|| {
                format!(
                    "Password must have at least {MIN_PASSWORD_LEN} characters, with upper and \
                     lower case letters, digits and one of {PASSWORD_SPECIALS}"
                )
            }),
            Rule::Cpf => (!is_cpf_format(value))
                .then(|| "CPF must be in the format 123.456.789-00".to_string()),
        }
    }
}

/// Collects violations for one record.
#[derive(Debug, Default)]
pub struct FieldRules {
    violations: Violations,
}

impl FieldRules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks one field. Blank optional fields (no [`Rule::Required`]) are skipped.
    pub fn check(
        &mut self,
        field: &str,
        label: &str,
        value: Option<&str>,
        rules: &[Rule],
    ) -> &mut Self {
        let value = value.unwrap_or("");

        if value.trim().is_empty() {
            if rules.contains(&Rule::Required) {
                self.violations
                    .insert(field.to_string(), format!("{label} is required"));
            }
            return self;
        }

        if let Some(message) = rules.iter().find_map(|rule| rule.check(label, value)) {
            self.violations.insert(field.to_string(), message);
        }
        self
    }

    /// Records a violation that no single-field rule expresses.
    pub fn reject(&mut self, field: &str, message: impl Into<String>) -> &mut Self {
        self.violations.insert(field.to_string(), message.into());
        self
    }

    pub fn finish(self) -> Result<(), Violations> {
        if self.violations.is_empty() {
            Ok(())
        } else {
            Err(self.violations)
        }
    }
}

pub fn validate(record: &FarmRecord) -> Result<(), Violations> {
    match record {
        FarmRecord::User(user) => validate_user(user),
        FarmRecord::Animal(animal) => validate_animal(animal),
        FarmRecord::Health(record) => validate_health_record(record),
        FarmRecord::Production(record) => validate_production_record(record),
    }
}

pub fn validate_user(user: &User) -> Result<(), Violations> {
    use Rule::*;

    let mut rules = FieldRules::new();
    rules
        .check(
            "nomeCompleto",
            "Full name",
            Some(user.nome_completo.as_str()),
            &[Required, MinLength(MIN_NAME_LEN)],
        )
        .check(
            "nomeUsuario",
            "Username",
            Some(user.nome_usuario.as_str()),
            &[Required],
        )
        .check(
            "senha",
            "Password",
            Some(user.senha.as_str()),
            &[Required, Password],
        )
        .check(
            "email",
            "E-mail",
            Some(user.email.as_str()),
            &[Required, Email],
        )
        .check("cpf", "CPF", Some(user.cpf.as_str()), &[Required, Cpf])
        .check(
            "dataNascimento",
            "Birth date",
            Some(user.data_nascimento.as_str()),
            &[Required, Date],
        )
        .check(
            "endereco",
            "Address",
            Some(user.endereco.as_str()),
            &[Required],
        );
    rules.finish()
}

pub fn validate_animal(animal: &Animal) -> Result<(), Violations> {
    use Rule::*;

    let mut rules = FieldRules::new();

    let has_tag = is_filled(animal.codigo_brinco.as_deref());
    let has_name = is_filled(animal.nome.as_deref());
    if !has_tag && !has_name {
        rules.reject("codigoBrinco", "Ear tag code or name is required");
    }

    rules
        .check(
            "codigoBrinco",
            "Ear tag code",
            animal.codigo_brinco.as_deref(),
            &[MinLength(MIN_NAME_LEN)],
        )
        .check(
            "nome",
            "Name",
            animal.nome.as_deref(),
            &[MinLength(MIN_NAME_LEN)],
        )
        .check("raca", "Breed", Some(animal.raca.as_str()), &[Required])
        .check("sexo", "Sex", Some(animal.sexo.as_str()), &[Required])
        .check("peso", "Weight", animal.peso.as_deref(), &[Positive])
        .check(
            "idade",
            "Age",
            animal.idade.as_deref(),
            &[Positive, Integer],
        )
        .check(
            "dataNascimento",
            "Birth date",
            animal.data_nascimento.as_deref(),
            &[Date],
        );
    rules.finish()
}

pub fn validate_health_record(record: &HealthRecord) -> Result<(), Violations> {
    match record {
        HealthRecord::Checkup(checkup) => validate_checkup(checkup),
        HealthRecord::Vaccination(vaccination) => validate_vaccination(vaccination),
    }
}

fn validate_checkup(checkup: &HealthCheckup) -> Result<(), Violations> {
    use Rule::*;

    let mut rules = FieldRules::new();
    rules
        .check(
            "veterinario",
            "Veterinarian",
            Some(checkup.veterinario.as_str()),
            &[Required],
        )
        .check(
            "status",
            "Status",
            Some(checkup.status.as_str()),
            &[Required],
        )
        .check(
            "apetite",
            "Appetite",
            Some(checkup.apetite.as_str()),
            &[Required],
        )
        .check(
            "temperatura",
            "Temperature",
            Some(checkup.temperatura.as_str()),
            &[Required, Positive],
        )
        .check(
            "dataVerificacao",
            "Check date",
            Some(checkup.data_verificacao.as_str()),
            &[Required, Date],
        );
    rules.finish()
}

/// `tratamento` may be left out entirely, but once sent it must not be blank.
fn validate_vaccination(vaccination: &Vaccination) -> Result<(), Violations> {
    use Rule::*;

    let mut rules = FieldRules::new();
    rules
        .check(
            "vacina",
            "Vaccine",
            Some(vaccination.vacina.as_str()),
            &[Required],
        )
        .check(
            "dataVacina",
            "Vaccination date",
            Some(vaccination.data_vacina.as_str()),
            &[Required, Date],
        );
    if let Some(tratamento) = &vaccination.tratamento {
        rules.check(
            "tratamento",
            "Treatment",
            Some(tratamento.as_str()),
            &[Required],
        );
    }
    rules.finish()
}

pub fn validate_production_record(record: &ProductionRecord) -> Result<(), Violations> {
    match record {
        ProductionRecord::Daily(daily) => validate_daily_production(daily),
        ProductionRecord::Output(output) => validate_production_output(output),
    }
}

fn validate_daily_production(daily: &DailyProduction) -> Result<(), Violations> {
    use Rule::*;

    let mut rules = FieldRules::new();
    rules
        .check("leite", "Milk", daily.leite.as_deref(), &[Positive])
        .check(
            "ganhoPeso",
            "Weight gain",
            Some(daily.ganho_peso.as_str()),
            &[Required, Positive],
        )
        .check(
            "dataProducao",
            "Production date",
            Some(daily.data_producao.as_str()),
            &[Required, Date],
        )
        .check(
            "tipoAnimal",
            "Animal type",
            Some(daily.tipo_animal.as_str()),
            &[Required],
        );
    rules.finish()
}

fn validate_production_output(output: &ProductionOutput) -> Result<(), Violations> {
    use Rule::*;

    let mut rules = FieldRules::new();
    rules
        .check(
            "tipoProducao",
            "Production type",
            Some(output.tipo_producao.as_str()),
            &[Required],
        )
        .check(
            "quantidadeProduzida",
            "Quantity",
            Some(output.quantidade_produzida.as_str()),
            &[Required, Positive],
        )
        .check(
            "data",
            "Date",
            Some(output.data.as_str()),
            &[Required, Date],
        );
    rules.finish()
}

fn is_filled(value: Option<&str>) -> bool {
    value.is_some_and(|s| !s.trim().is_empty())
}

/// Parses a decimal number typed into a form. Non-finite values are rejected.
pub fn parse_number(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

/// `DD/MM/YYYY`, digits only. Purely syntactic: `31/02/2024` is accepted.
pub fn is_date_format(value: &str) -> bool {
    DATE_RE.is_match(value)
}

/// `DDD.DDD.DDD-DD`. No check digit verification.
pub fn is_cpf_format(value: &str) -> bool {
    CPF_RE.is_match(value)
}

/// At least one of each class, nothing outside letters, digits and [`PASSWORD_SPECIALS`].
pub fn is_strong_password(value: &str) -> bool {
    PASSWORD_CHARSET_RE.is_match(value)
        && PASSWORD_CLASSES.iter().all(|class| class.is_match(value))
}

pub fn is_email(value: &str) -> bool {
    EMAIL_RE.is_match(value)
}
