//! Interactive session: prompt for an address and a radius, run the query,
//! print the result, repeat until the address is left empty.

use dialoguer::Input;
use georisk_risk_models::{Query, RiskCategory, SearchRadius};

use crate::pipeline::{self, QueryBackend, QueryContext, QueryState};

/// Runs the prompt loop.
///
/// Query failures are printed and the session continues; only prompt I/O
/// errors end it.
///
/// # Errors
///
/// Returns an error if the terminal cannot be read.
pub async fn run<B: QueryBackend>(
    ctx: &QueryContext<'_, B>,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("Know Your Risk - GeoRisques Explorer");
    println!("Enter a French postal address to see past natural catastrophe declarations nearby.");
    println!("Leave the address empty to quit.");
    println!();

    let mut radius = SearchRadius::DEFAULT;
    let mut state = QueryState::NoQuery;

    loop {
        let address: String = Input::new()
            .with_prompt("Address")
            .allow_empty(true)
            .interact_text()?;
        if address.trim().is_empty() {
            break;
        }

        radius = prompt_radius(radius)?;

        let query = Query {
            address,
            radius,
            category: RiskCategory::default(),
        };

        match pipeline::run_query(ctx, &query).await {
            Ok(next) => state = next,
            Err(e) => {
                log::error!("Query failed: {e}");
                println!("Could not display the results: {e}");
                continue;
            }
        }

        pipeline::print_state(&state);
        println!();
    }

    if let QueryState::Rendered(rendered) = &state {
        println!("Last map: {}", rendered.files.html.display());
    }

    Ok(())
}

fn prompt_radius(previous: SearchRadius) -> Result<SearchRadius, dialoguer::Error> {
    let meters: u32 = Input::new()
        .with_prompt(format!(
            "Search radius in metres ({}-{})",
            SearchRadius::MIN,
            SearchRadius::MAX
        ))
        .default(previous.meters())
        .validate_with(|m: &u32| SearchRadius::new(*m).map(|_| ()))
        .interact_text()?;

    Ok(SearchRadius::new(meters).unwrap_or(previous))
}
