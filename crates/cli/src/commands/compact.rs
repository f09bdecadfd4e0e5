// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::CliStore;

pub fn handle(store: &CliStore) -> anyhow::Result<()> {
    let driver = store.driver().inner();
    let result = driver.compact()?;
    println!(
        "Compacted {}: {} entries -> {} ({} bytes reclaimed)",
        driver.dir().display(),
        result.entries_before,
        result.entries_after,
        result.bytes_reclaimed
    );
    Ok(())
}
