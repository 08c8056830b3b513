//! Query command - answer one question from the terminal

use super::QueryArgs;

pub async fn run(args: QueryArgs) -> anyhow::Result<()> {
    let (config, secrets) = super::bootstrap()?;
    let state = crate::create_app_state(&config, &secrets).await?;

    let result = state.query_engine.query(&args.query, args.k).await?;

    if args.show_passages {
        for (i, passage) in result.chunks.iter().enumerate() {
            println!(
                "[{}] {} page {} (score {:.3})\n{}\n",
                i + 1,
                passage.metadata.source_id,
                passage.metadata.page_index + 1,
                passage.score,
                passage.text.trim()
            );
        }
    }

    println!("{}", result.answer);
    Ok(())
}
