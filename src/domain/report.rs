// Activity report model and its fixed set of form fields

use crate::domain::account::Unit;
use crate::domain::form::{DecimalBound, FieldError, FieldKind, FieldSpec, FormValues, RSO_MAX_DIGITS};
use crate::errors::Result;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ============================================================================
// Scale Type
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ScaleType {
    #[serde(rename = "Ordinária")]
    Ordinaria,
    #[serde(rename = "DEJEM")]
    Dejem,
}

impl ScaleType {
    pub const ALL: [ScaleType; 2] = [ScaleType::Ordinaria, ScaleType::Dejem];

    pub fn label(&self) -> &'static str {
        match self {
            ScaleType::Ordinaria => "Ordinária",
            ScaleType::Dejem => "DEJEM",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ALL.into_iter().find(|s| s.label() == label)
    }
}

mod integrated_unit {
    use crate::domain::account::Unit;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(unit: &Option<Unit>, serializer: S) -> Result<S::Ok, S::Error> {
        match unit {
            Some(unit) => serializer.serialize_str(unit.integrated_label()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Unit>, D::Error> {
        Option::<Unit>::deserialize(deserializer)
    }
}

mod short_unit {
    use crate::domain::account::Unit;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(unit: &Option<Unit>, serializer: S) -> Result<S::Ok, S::Error> {
        match unit {
            Some(unit) => serializer.serialize_str(unit.short_label()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Unit>, D::Error> {
        Option::<Unit>::deserialize(deserializer)
    }
}

// ============================================================================
// Activity Fields
// ============================================================================

/// Everything an officer fills in for one shift
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ActivityFields {
    // Shift metadata
    #[serde(with = "integrated_unit")]
    pub equipes_integradas: Option<Unit>,
    pub numero_rso: Option<String>,
    pub tipo_escala: Option<ScaleType>,
    pub tempo_trabalho: Option<Decimal>,
    #[serde(with = "short_unit")]
    pub pelotao: Option<Unit>,
    pub encarregado_equipe: Option<String>,
    pub primeiro_auxiliar: Option<String>,
    pub segundo_auxiliar: Option<String>,

    // Inspections
    #[serde(rename = "fiscalizacaoTCRA")]
    pub fiscalizacao_tcra: u8,
    pub fiscalizacoes_patio_madeireiro: u8,
    #[serde(rename = "fiscalizacoesUC")]
    pub fiscalizacoes_uc: u8,
    #[serde(rename = "fiscalizacoesRPPN")]
    pub fiscalizacoes_rppn: u8,
    pub fiscalizacoes_criador_amador: u8,
    pub fiscalizacoes_caca: u8,
    pub fiscalizacoes_pesca: u8,
    pub fiscalizacoes_piracema: u8,

    // Occurrences
    pub tva: u8,
    pub bo_pamb: u8,
    pub aia: u8,
    pub multa_arbitrada: Option<Decimal>,
    pub area_autuada: u8,
    pub palmito_in_natura: u8,
    pub palmito_beneficiado: Option<Decimal>,
    pub pescado_apreendido: Option<Decimal>,

    // Seizures and approaches
    pub animais_apreendidos: u8,
    pub pessoas_abordadas: u8,
    #[serde(rename = "pessoasAutuadasAIA")]
    pub pessoas_autuadas_aia: u8,
    pub pessoas_presas: u8,
    pub pessoas_foragidas: u8,
    pub armas_fogo_apreendidas: u8,
    pub armas_brancas_apreendidas: u8,
    pub municoes_apreendidas: u8,
    pub entorpecentes_apreendidos: Option<Decimal>,

    // Inspected and seized vehicles
    pub embarcacoes_vistoriadas: u8,
    pub embarcacoes_apreendidas: u8,
    pub veiculos_vistoriados: u8,
    pub veiculos_apreendidos: u8,
    pub veiculos_recuperados: u8,

    pub horas_policiamento_nautico: Option<Decimal>,
}

/// Form layout, in display order
pub fn report_field_specs() -> Vec<FieldSpec> {
    let integrated = Unit::ALL.iter().map(Unit::integrated_label).collect();
    let short = Unit::ALL.iter().map(Unit::short_label).collect();
    let scales = ScaleType::ALL.iter().map(ScaleType::label).collect();

    vec![
        FieldSpec::select("equipesIntegradas", "Equipes Integradas", integrated),
        FieldSpec {
            name: "numeroRso",
            label: "Número do RSO",
            kind: FieldKind::Digits {
                max_len: RSO_MAX_DIGITS,
            },
        },
        FieldSpec::select("tipoEscala", "Tipo de Escala", scales),
        FieldSpec::decimal("tempoTrabalho", "Tempo de Trabalho", DecimalBound::WORK_TIME),
        FieldSpec::select("pelotao", "Pelotão", short),
        FieldSpec::person_name("encarregadoEquipe", "Encarregado da Equipe"),
        FieldSpec::person_name("primeiroAuxiliar", "1º Auxiliar"),
        FieldSpec::person_name("segundoAuxiliar", "2º Auxiliar"),
        FieldSpec::counter("fiscalizacaoTCRA", "Fiscalização de TCRA (un.)"),
        FieldSpec::counter("fiscalizacoesPatioMadeireiro", "Fisc. Pátio Madeireiro (un.)"),
        FieldSpec::counter("fiscalizacoesUC", "Fisc. UC (exceto RPPN) (un.)"),
        FieldSpec::counter("fiscalizacoesRPPN", "Fisc. RPPN (un.)"),
        FieldSpec::counter("fiscalizacoesCriadorAmador", "Fisc. Criador Amador (un.)"),
        FieldSpec::counter("fiscalizacoesCaca", "Fisc. Caça (em AISPA) (un.)"),
        FieldSpec::counter("fiscalizacoesPesca", "Fisc. Pesca (em AISPA) (un.)"),
        FieldSpec::counter("fiscalizacoesPiracema", "Fisc. em Piracema (un.)"),
        FieldSpec::counter("tva", "TVA (un.)"),
        FieldSpec::counter("boPamb", "BO/PAmb (un.)"),
        FieldSpec::counter("aia", "AIA (un.)"),
        FieldSpec::decimal("multaArbitrada", "Multa Arbitrada (R$)", DecimalBound::AMOUNT),
        FieldSpec::counter("areaAutuada", "Área Autuada (ha)"),
        FieldSpec::counter("palmitoInNatura", "Palmito in natura (un.)"),
        FieldSpec::decimal("palmitoBeneficiado", "Palmito beneficiado (kg)", DecimalBound::AMOUNT),
        FieldSpec::decimal("pescadoApreendido", "Pescado Apreendido (kg)", DecimalBound::AMOUNT),
        FieldSpec::counter("animaisApreendidos", "Animais Apreendidos (un.)"),
        FieldSpec::counter("pessoasAbordadas", "Pessoas Abordadas (un.)"),
        FieldSpec::counter("pessoasAutuadasAIA", "Pessoas Autuadas em AIA (un.)"),
        FieldSpec::counter("pessoasPresas", "Pessoas Presas (un.)"),
        FieldSpec::counter("pessoasForagidas", "Foragidos Capturados (un.)"),
        FieldSpec::counter("armasFogoApreendidas", "Armas de Fogo Apreendidas (un.)"),
        FieldSpec::counter("armasBrancasApreendidas", "Armas Brancas Apreendidas (un.)"),
        FieldSpec::counter("municoesApreendidas", "Munições Apreendidas (un.)"),
        FieldSpec::decimal(
            "entorpecentesApreendidos",
            "Entorpecentes Apreendidos (kg)",
            DecimalBound::AMOUNT,
        ),
        FieldSpec::counter("embarcacoesVistoriadas", "Embarcações Vistoriadas (un.)"),
        FieldSpec::counter("embarcacoesApreendidas", "Embarcações Apreendidas (un.)"),
        FieldSpec::counter("veiculosVistoriados", "Veículos Vistoriados (un.)"),
        FieldSpec::counter("veiculosApreendidos", "Veículos Apreendidos (un.)"),
        FieldSpec::counter("veiculosRecuperados", "Veículos Recuperados (un.)"),
        FieldSpec::decimal(
            "horasPoliciamentoNautico",
            "Horas de Policiamento Náutico",
            DecimalBound::HOURS,
        ),
    ]
}

impl ActivityFields {
    /// Parse and validate a flat form payload
    pub fn from_form(values: &HashMap<String, String>) -> Result<Self> {
        let mut form = FormValues::new(values);
        let fields = Self::parse(&mut form);
        form.finish()?;
        Ok(fields)
    }

    /// Same as [`ActivityFields::from_form`] but hands back the field errors
    pub fn try_from_form(values: &HashMap<String, String>) -> std::result::Result<Self, Vec<FieldError>> {
        let mut form = FormValues::new(values);
        let fields = Self::parse(&mut form);
        let errors = form.into_errors();
        if errors.is_empty() {
            Ok(fields)
        } else {
            Err(errors)
        }
    }

    fn parse(form: &mut FormValues<'_>) -> Self {
        Self {
            equipes_integradas: form.choice("equipesIntegradas", Unit::from_label),
            numero_rso: form.digits("numeroRso", RSO_MAX_DIGITS),
            tipo_escala: form.choice("tipoEscala", ScaleType::from_label),
            tempo_trabalho: form.decimal("tempoTrabalho", DecimalBound::WORK_TIME),
            pelotao: form.choice("pelotao", Unit::from_label),
            encarregado_equipe: form.person_name("encarregadoEquipe"),
            primeiro_auxiliar: form.person_name("primeiroAuxiliar"),
            segundo_auxiliar: form.person_name("segundoAuxiliar"),
            fiscalizacao_tcra: form.counter("fiscalizacaoTCRA"),
            fiscalizacoes_patio_madeireiro: form.counter("fiscalizacoesPatioMadeireiro"),
            fiscalizacoes_uc: form.counter("fiscalizacoesUC"),
            fiscalizacoes_rppn: form.counter("fiscalizacoesRPPN"),
            fiscalizacoes_criador_amador: form.counter("fiscalizacoesCriadorAmador"),
            fiscalizacoes_caca: form.counter("fiscalizacoesCaca"),
            fiscalizacoes_pesca: form.counter("fiscalizacoesPesca"),
            fiscalizacoes_piracema: form.counter("fiscalizacoesPiracema"),
            tva: form.counter("tva"),
            bo_pamb: form.counter("boPamb"),
            aia: form.counter("aia"),
            multa_arbitrada: form.decimal("multaArbitrada", DecimalBound::AMOUNT),
            area_autuada: form.counter("areaAutuada"),
            palmito_in_natura: form.counter("palmitoInNatura"),
            palmito_beneficiado: form.decimal("palmitoBeneficiado", DecimalBound::AMOUNT),
            pescado_apreendido: form.decimal("pescadoApreendido", DecimalBound::AMOUNT),
            animais_apreendidos: form.counter("animaisApreendidos"),
            pessoas_abordadas: form.counter("pessoasAbordadas"),
            pessoas_autuadas_aia: form.counter("pessoasAutuadasAIA"),
            pessoas_presas: form.counter("pessoasPresas"),
            pessoas_foragidas: form.counter("pessoasForagidas"),
            armas_fogo_apreendidas: form.counter("armasFogoApreendidas"),
            armas_brancas_apreendidas: form.counter("armasBrancasApreendidas"),
            municoes_apreendidas: form.counter("municoesApreendidas"),
            entorpecentes_apreendidos: form.decimal("entorpecentesApreendidos", DecimalBound::AMOUNT),
            embarcacoes_vistoriadas: form.counter("embarcacoesVistoriadas"),
            embarcacoes_apreendidas: form.counter("embarcacoesApreendidas"),
            veiculos_vistoriados: form.counter("veiculosVistoriados"),
            veiculos_apreendidos: form.counter("veiculosApreendidos"),
            veiculos_recuperados: form.counter("veiculosRecuperados"),
            horas_policiamento_nautico: form.decimal("horasPoliciamentoNautico", DecimalBound::HOURS),
        }
    }

    /// Flat text values in form order; the inverse of [`ActivityFields::from_form`]
    pub fn to_form(&self) -> Vec<(&'static str, String)> {
        fn text(value: &Option<String>) -> String {
            value.clone().unwrap_or_default()
        }
        fn number(value: &Option<Decimal>) -> String {
            value.map(|d| d.to_string()).unwrap_or_default()
        }

        vec![
            (
                "equipesIntegradas",
                self.equipes_integradas
                    .map(|u| u.integrated_label().to_string())
                    .unwrap_or_default(),
            ),
            ("numeroRso", text(&self.numero_rso)),
            (
                "tipoEscala",
                self.tipo_escala
                    .map(|s| s.label().to_string())
                    .unwrap_or_default(),
            ),
            ("tempoTrabalho", number(&self.tempo_trabalho)),
            (
                "pelotao",
                self.pelotao
                    .map(|u| u.short_label().to_string())
                    .unwrap_or_default(),
            ),
            ("encarregadoEquipe", text(&self.encarregado_equipe)),
            ("primeiroAuxiliar", text(&self.primeiro_auxiliar)),
            ("segundoAuxiliar", text(&self.segundo_auxiliar)),
            ("fiscalizacaoTCRA", self.fiscalizacao_tcra.to_string()),
            (
                "fiscalizacoesPatioMadeireiro",
                self.fiscalizacoes_patio_madeireiro.to_string(),
            ),
            ("fiscalizacoesUC", self.fiscalizacoes_uc.to_string()),
            ("fiscalizacoesRPPN", self.fiscalizacoes_rppn.to_string()),
            (
                "fiscalizacoesCriadorAmador",
                self.fiscalizacoes_criador_amador.to_string(),
            ),
            ("fiscalizacoesCaca", self.fiscalizacoes_caca.to_string()),
            ("fiscalizacoesPesca", self.fiscalizacoes_pesca.to_string()),
            ("fiscalizacoesPiracema", self.fiscalizacoes_piracema.to_string()),
            ("tva", self.tva.to_string()),
            ("boPamb", self.bo_pamb.to_string()),
            ("aia", self.aia.to_string()),
            ("multaArbitrada", number(&self.multa_arbitrada)),
            ("areaAutuada", self.area_autuada.to_string()),
            ("palmitoInNatura", self.palmito_in_natura.to_string()),
            ("palmitoBeneficiado", number(&self.palmito_beneficiado)),
            ("pescadoApreendido", number(&self.pescado_apreendido)),
            ("animaisApreendidos", self.animais_apreendidos.to_string()),
            ("pessoasAbordadas", self.pessoas_abordadas.to_string()),
            ("pessoasAutuadasAIA", self.pessoas_autuadas_aia.to_string()),
            ("pessoasPresas", self.pessoas_presas.to_string()),
            ("pessoasForagidas", self.pessoas_foragidas.to_string()),
            ("armasFogoApreendidas", self.armas_fogo_apreendidas.to_string()),
            (
                "armasBrancasApreendidas",
                self.armas_brancas_apreendidas.to_string(),
            ),
            ("municoesApreendidas", self.municoes_apreendidas.to_string()),
            (
                "entorpecentesApreendidos",
                number(&self.entorpecentes_apreendidos),
            ),
            ("embarcacoesVistoriadas", self.embarcacoes_vistoriadas.to_string()),
            ("embarcacoesApreendidas", self.embarcacoes_apreendidas.to_string()),
            ("veiculosVistoriados", self.veiculos_vistoriados.to_string()),
            ("veiculosApreendidos", self.veiculos_apreendidos.to_string()),
            ("veiculosRecuperados", self.veiculos_recuperados.to_string()),
            (
                "horasPoliciamentoNautico",
                number(&self.horas_policiamento_nautico),
            ),
        ]
    }
}

// ============================================================================
// Activity Report
// ============================================================================

/// A submitted shift record. Never updated in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityReport {
    pub id: String,
    #[serde(rename = "userId")]
    pub account_id: String,
    /// Display name captured at submission time
    pub submitted_by: String,
    pub submitted_at: DateTime<Utc>,
    #[serde(flatten)]
    pub fields: ActivityFields,
}

/// A report that has not been assigned an id yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReport {
    pub account_id: String,
    pub submitted_by: String,
    pub submitted_at: DateTime<Utc>,
    pub fields: ActivityFields,
}

impl NewReport {
    pub fn into_report(self, id: String) -> ActivityReport {
        ActivityReport {
            id,
            account_id: self.account_id,
            submitted_by: self.submitted_by,
            submitted_at: self.submitted_at,
            fields: self.fields,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AppError;

    fn form(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_blank_form_defaults() {
        let fields = ActivityFields::from_form(&HashMap::new()).unwrap();
        assert_eq!(fields, ActivityFields::default());
    }

    #[test]
    fn test_full_form_parses() {
        let fields = ActivityFields::from_form(&form(&[
            ("equipesIntegradas", "2º pel."),
            ("numeroRso", "004512"),
            ("tipoEscala", "DEJEM"),
            ("tempoTrabalho", "8.5"),
            ("pelotao", "2º"),
            ("encarregadoEquipe", "Souza"),
            ("tva", "2"),
            ("boPamb", "1"),
            ("multaArbitrada", "350.75"),
            ("pessoasAbordadas", "10"),
            ("horasPoliciamentoNautico", "3.5"),
        ]))
        .unwrap();

        assert_eq!(fields.equipes_integradas, Some(Unit::SecondPlatoon));
        assert_eq!(fields.numero_rso.as_deref(), Some("004512"));
        assert_eq!(fields.tipo_escala, Some(ScaleType::Dejem));
        assert_eq!(fields.tempo_trabalho, Some(Decimal::new(85, 1)));
        assert_eq!(fields.pelotao, Some(Unit::SecondPlatoon));
        assert_eq!(fields.tva, 2);
        assert_eq!(fields.multa_arbitrada, Some(Decimal::new(35075, 2)));
        assert_eq!(fields.pessoas_abordadas, 10);
    }

    #[test]
    fn test_invalid_fields_are_all_reported() {
        let result = ActivityFields::from_form(&form(&[
            ("tva", "12"),
            ("encarregadoEquipe", "Sgt. 01"),
            ("tipoEscala", "Extra"),
        ]));

        match result {
            Err(AppError::Validation(errors)) => {
                let mut fields: Vec<_> = errors.into_iter().map(|e| e.field).collect();
                fields.sort();
                assert_eq!(fields, vec!["encarregadoEquipe", "tipoEscala", "tva"]);
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_to_form_round_trips() {
        let fields = ActivityFields {
            equipes_integradas: Some(Unit::SecondCompany),
            pelotao: Some(Unit::ThirdPlatoon),
            tipo_escala: Some(ScaleType::Ordinaria),
            pescado_apreendido: Some(Decimal::new(1205, 2)),
            animais_apreendidos: 7,
            ..Default::default()
        };

        let values: HashMap<String, String> = fields
            .to_form()
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        assert_eq!(ActivityFields::from_form(&values).unwrap(), fields);
    }

    #[test]
    fn test_specs_cover_every_form_field() {
        let spec_names: Vec<_> = report_field_specs().iter().map(|s| s.name).collect();
        let form_names: Vec<_> = ActivityFields::default()
            .to_form()
            .into_iter()
            .map(|(name, _)| name)
            .collect();
        assert_eq!(spec_names, form_names);
    }

    #[test]
    fn test_report_json_uses_field_names() {
        let report = NewReport {
            account_id: "u1".to_string(),
            submitted_by: "Joao".to_string(),
            submitted_at: Utc::now(),
            fields: ActivityFields {
                fiscalizacao_tcra: 3,
                equipes_integradas: Some(Unit::FirstPlatoon),
                pelotao: Some(Unit::FirstPlatoon),
                ..Default::default()
            },
        }
        .into_report("r1".to_string());

        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["userId"], "u1");
        assert_eq!(value["fiscalizacaoTCRA"], 3);
        assert_eq!(value["equipesIntegradas"], "1º pel.");
        assert_eq!(value["pelotao"], "1º");

        let back: ActivityReport = serde_json::from_value(value).unwrap();
        assert_eq!(back, report);
    }
}
