use crate::config::OutputFormat;
use crate::models::LocationQuery;

/// Instruction text for one query under the given profile.
pub fn build_prompt(format: OutputFormat, query: &LocationQuery, language: &str) -> String {
    match format {
        OutputFormat::Prose => prose_prompt(query, language),
        OutputFormat::Terse => terse_prompt(query, language),
    }
}

fn prose_prompt(query: &LocationQuery, language: &str) -> String {
    format!(
        r#"Você é um especialista em rotas e geografia.
Calcule a distância e o tempo de viagem entre a origem: "{origin}" e o destino: "{destination}".

REGRAS:
1. Forneça a distância exata ou estimada em quilômetros.
2. Informe o tempo médio de viagem (carro, ônibus, etc).
3. Descreva brevemente a principal rodovia ou rota.
4. Responda obrigatoriamente em {language}.
5. Se não encontrar dados exatos, forneça uma estimativa baseada em seu conhecimento geográfico."#,
        origin = query.origin,
        destination = query.destination,
        language = language,
    )
}

fn terse_prompt(query: &LocationQuery, language: &str) -> String {
    format!(
        r#"Calcule a distância rodoviária entre a origem: "{origin}" e o destino: "{destination}".

REGRAS:
1. Responda com UMA única linha, exatamente no formato: Total KM: <número>
2. Não escreva nenhum outro texto, explicação ou unidade adicional.
3. Use o idioma {language} caso precise escrever algo além do número.
4. Se não encontrar dados exatos, forneça uma estimativa baseada em seu conhecimento geográfico."#,
        origin = query.origin,
        destination = query.destination,
        language = language,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query() -> LocationQuery {
        LocationQuery {
            origin: "Curitiba, PR".to_string(),
            destination: "Florianópolis, SC".to_string(),
        }
    }

    #[test]
    fn test_prose_prompt_names_places_and_language() {
        let prompt = build_prompt(OutputFormat::Prose, &query(), "Português do Brasil");
        assert!(prompt.contains("\"Curitiba, PR\""));
        assert!(prompt.contains("\"Florianópolis, SC\""));
        assert!(prompt.contains("Responda obrigatoriamente em Português do Brasil."));
        assert!(prompt.contains("rodovia"));
    }

    #[test]
    fn test_terse_prompt_demands_fixed_line() {
        let prompt = build_prompt(OutputFormat::Terse, &query(), "Português do Brasil");
        assert!(prompt.contains("Total KM: <número>"));
        assert!(!prompt.contains("tempo médio"));
    }
}
