//! Cross-lane overview: the latest week of every chart, each compared with
//! its nearest earlier week inside the window.

use crate::chart::compare::{compare, Comparison};
use crate::chart::window::{Selection, Window};
use crate::error::Result;
use crate::store::Store;

/// One comparison per stored chart lane, in lane order.
pub fn latest_comparisons(store: &Store, window: &Window) -> Result<Vec<Comparison>> {
    let mut comparisons = Vec::new();

    for chart_key in store.chart_keys()? {
        let Some(current) = store.latest_snapshot(&chart_key)? else {
            continue;
        };

        let pool = store.load_pool_before(&chart_key, current.week)?;
        let previous = window.resolve(&pool, &current, Selection::Auto);

        tracing::debug!(
            chart = %chart_key,
            week = %current.week,
            compared = ?previous.map(|p| p.week.to_string()),
            "overview lane"
        );
        comparisons.push(compare(&current, previous));
    }

    Ok(comparisons)
}
