use colored::Colorize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::shell::{Shell, ShellState, SubmitOutcome};

/// Plain-text rendering of the shell state after a submission.
pub fn render_state(state: &ShellState) -> String {
    let mut out = String::new();
    if let Some(error) = &state.error {
        out.push_str(&format!("{} {}\n", "✗".red().bold(), error.red()));
    }
    if let Some(result) = &state.result {
        out.push_str(&format!("\n{}\n", "Resultado da Análise".bold()));
        out.push_str(&result.text);
        out.push('\n');
        if !result.sources.is_empty() {
            out.push_str(&format!("\n{}\n", "Fontes e Referências".bold()));
            for (i, source) in result.sources.iter().enumerate() {
                let title = source.title.as_deref().unwrap_or(&source.uri);
                out.push_str(&format!("  {}. {} <{}>\n", i + 1, title, source.uri.blue().underline()));
            }
        }
    }
    out
}

async fn prompt_line<R, W>(reader: &mut R, writer: &mut W, label: &str) -> std::io::Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    writer.write_all(format!("{} ", label.cyan().bold()).as_bytes()).await?;
    writer.flush().await?;
    let mut line = String::new();
    if reader.read_line(&mut line).await? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}

/// Ask for origin and destination until input ends.
pub async fn run<R, W>(shell: &Shell, mut reader: R, mut writer: W) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    writer
        .write_all(format!("{}\n", "MapDistance AI".bold()).as_bytes())
        .await?;
    if let Some(geo_error) = shell.snapshot().await.geo_error {
        writer.write_all(format!("{}\n", geo_error.dimmed()).as_bytes()).await?;
    }

    loop {
        let Some(origin) = prompt_line(&mut reader, &mut writer, "Ponto de Origem:").await? else {
            break;
        };
        let Some(destination) = prompt_line(&mut reader, &mut writer, "Ponto de Destino:").await?
        else {
            break;
        };

        writer
            .write_all(format!("{}\n", "Consultando Inteligência...".dimmed()).as_bytes())
            .await?;
        writer.flush().await?;

        let outcome = shell.submit_query(origin, destination).await;
        if outcome != SubmitOutcome::Stale {
            writer
                .write_all(render_state(&shell.snapshot().await).as_bytes())
                .await?;
        }
        writer.write_all(b"\n").await?;
        writer.flush().await?;
    }

    tracing::info!("Terminal input closed");
    Ok(())
}
