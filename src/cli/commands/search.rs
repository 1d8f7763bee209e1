use crate::config::Config;
use crate::domain::ProviderName;
use crate::metadata::SearchOpts;
use crate::state::SharedState;

pub async fn cmd_search(
    config: Config,
    provider: &str,
    query: &str,
    limit: i64,
) -> anyhow::Result<()> {
    let provider: ProviderName = provider.parse()?;
    println!("Searching {provider} for: {query}");

    let state = SharedState::new(config).await?;
    let results = state
        .metadata
        .search(provider, query, SearchOpts { page: 1, limit })
        .await?;

    if results.is_empty() {
        println!("No shows found matching '{query}'");
        return Ok(());
    }

    println!();
    println!("{:-<60}", "");
    for show in &results {
        println!(
            "{}\t{}\t{}\t{}",
            show.external_id, show.title_preferred, show.show_type, show.status
        );
    }

    Ok(())
}
