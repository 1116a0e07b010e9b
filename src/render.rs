use crate::shell::ShellState;

const STYLE: &str = r#"
body{font-family:system-ui,sans-serif;background:#f8fafc;color:#0f172a;display:flex;flex-direction:column;align-items:center;padding:2.5rem 1rem;margin:0}
header{text-align:center;margin-bottom:2rem}
h1{font-size:2.5rem;margin:0}h1 span{color:#2563eb}
main{width:100%;max-width:40rem;background:#fff;border-radius:2rem;box-shadow:0 20px 40px #e2e8f0;padding:2rem}
label{display:block;font-weight:700;font-size:.875rem;margin:1rem 0 .5rem}
input{width:100%;box-sizing:border-box;padding:1rem;border:1px solid #e2e8f0;border-radius:1rem;font-size:1.1rem;background:#f8fafc}
button{width:100%;margin-top:1.5rem;padding:1.1rem;border:0;border-radius:1rem;background:#2563eb;color:#fff;font-size:1.1rem;font-weight:700;cursor:pointer}
.error{margin-top:1rem;padding:1rem;background:#fef2f2;border-left:4px solid #ef4444;color:#b91c1c;border-radius:.5rem;font-weight:600}
.result{margin-top:2rem;border-top:1px solid #f1f5f9;padding-top:1.5rem}
.result p{white-space:pre-wrap;line-height:1.6}
.sources a{display:block;margin:.4rem 0;color:#2563eb}
.geo{font-size:.8rem;color:#64748b;margin-top:1rem}
footer{margin-top:2rem;font-size:.8rem;color:#94a3b8}
"#;

/// Escape text for use inside HTML element content and quoted attributes.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Full form page for the current state.
pub fn render_page(state: &ShellState) -> String {
    let mut html = format!(
        r#"<!DOCTYPE html>
<html lang="pt-BR">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>MapDistance AI</title>
<style>{STYLE}</style>
</head>
<body>
<header>
<h1>MapDistance <span>AI</span></h1>
<p>Calcule distâncias e rotas inteligentes entre qualquer lugar do mundo.</p>
</header>
<main>
<form method="post" action="/">
<label for="origin">Ponto de Origem</label>
<input id="origin" name="origin" type="text" autocomplete="off" placeholder="Ex: Curitiba, PR" value="{origin}">
<label for="destination">Ponto de Destino</label>
<input id="destination" name="destination" type="text" autocomplete="off" placeholder="Ex: Florianópolis, SC" value="{destination}">
"#,
        origin = escape_html(&state.origin),
        destination = escape_html(&state.destination),
    );

    if let Some(error) = &state.error {
        html.push_str(&format!(
            "<div class=\"error\">{}</div>\n",
            escape_html(error)
        ));
    }

    html.push_str(&format!(
        "<button type=\"submit\"{}>{}</button>\n</form>\n",
        if state.loading { " disabled" } else { "" },
        if state.loading {
            "Consultando Inteligência..."
        } else {
            "Calcular Rota e Distância"
        }
    ));

    if let Some(result) = &state.result {
        html.push_str(&format!(
            "<section class=\"result\">\n<h2>Resultado da Análise</h2>\n<p>{}</p>\n",
            escape_html(&result.text)
        ));
        if !result.sources.is_empty() {
            html.push_str("<div class=\"sources\">\n<h3>Fontes e Referências</h3>\n");
            for source in &result.sources {
                let title = source.title.as_deref().unwrap_or(&source.uri);
                html.push_str(&format!(
                    "<a href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\">{}</a>\n",
                    escape_html(&source.uri),
                    escape_html(title)
                ));
            }
            html.push_str("</div>\n");
        }
        html.push_str("</section>\n");
    }

    if let Some(geo_error) = &state.geo_error {
        html.push_str(&format!("<p class=\"geo\">{}</p>\n", escape_html(geo_error)));
    }

    html.push_str(
        "</main>\n<footer>Dados fornecidos por Gemini com Google Maps Grounding</footer>\n</body>\n</html>\n",
    );
    html
}
