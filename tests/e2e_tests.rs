//! End-to-end integration tests
//!
//! These tests validate the complete replay pipeline: seed balances and an
//! operation script are written to temp files, replayed through the engine
//! exactly as the binary does, and the emitted balances CSV is compared
//! against the expected output.

#[cfg(test)]
mod tests {
    use std::io::Write;

    use rstest::rstest;
    use tempfile::NamedTempFile;

    use bloom_ledger::io::write_balances_csv;
    use bloom_ledger::replay::{build_engine, replay_script};
    use bloom_ledger::EngineConfig;

    const HEADER: &str =
        "op,account,type,amount,currency,address,flowers,tickets,usd,entry_ref,status,notes\n";

    fn temp_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(content.as_bytes())
            .expect("Failed to write temp file");
        file.flush().expect("Failed to flush temp file");
        file
    }

    /// Replay `script_rows` against balances seeded from `seed_rows` and
    /// return the final balances CSV plus the number of failed rows.
    async fn run_pipeline(seed_rows: &str, script_rows: &str) -> (String, usize) {
        let seed = temp_file(&format!("account,flowers,tickets,bvr_coins\n{seed_rows}"));
        let script = temp_file(&format!("{HEADER}{script_rows}"));

        let (engine, balances) =
            build_engine(Some(seed.path()), EngineConfig::default()).expect("engine setup");
        let report = replay_script(&engine, script.path())
            .await
            .expect("replay run");

        let mut output = Vec::new();
        write_balances_csv(&balances.all(), &mut output).expect("balances output");
        (String::from_utf8(output).expect("utf8 output"), report.failures.len())
    }

    #[rstest]
    #[case::withdraw_then_cancel_restores_balance(
        "acct-1,1000,0,0\n",
        "withdraw,acct-1,,300,USD,1 Main St,,,,,,\n\
         set_status,,,,,,,,,1,cancelled,user request\n",
        "acct-1,1000,0,0\n",
        0
    )]
    #[case::completed_withdrawal_keeps_the_debit(
        "acct-1,1000,0,0\n",
        "withdraw,acct-1,,300,USD,1 Main St,,,,,,\n\
         set_status,,,,,,,,,1,completed,\n",
        "acct-1,700,0,0\n",
        0
    )]
    #[case::insufficient_bvr_is_rejected_without_trace(
        "acct-1,0,0,50\n",
        "withdraw,acct-1,,80,BVR,0xabc,,,,,,\n",
        "acct-1,0,0,50\n",
        1
    )]
    #[case::crypto_deposit_completion_grants_bonus_tickets(
        "acct-1,0,0,0\n",
        "deposit,acct-1,deposit_crypto,47,USD,,470,1,47,,,\n\
         set_status,,,,,,,,,1,completed,\n",
        "acct-1,470,5,0\n",
        0
    )]
    #[case::failed_bvr_withdrawal_refunds_bvr(
        "acct-1,0,0,100\n",
        "withdraw,acct-1,,40,BVR,0xabc,,,,,,\n\
         set_status,,,,,,,,,1,failed,\n",
        "acct-1,0,0,100\n",
        0
    )]
    #[case::second_cancel_is_rejected_and_does_not_double_refund(
        "acct-1,1000,0,0\n",
        "withdraw,acct-1,,300,USD,1 Main St,,,,,,\n\
         set_status,,,,,,,,,1,cancelled,\n\
         set_status,,,,,,,,,1,cancelled,\n",
        "acct-1,1000,0,0\n",
        1
    )]
    #[case::pending_deposit_has_no_effect(
        "acct-1,100,0,0\n",
        "deposit,acct-1,,50,USD,,500,2,,,,\n",
        "acct-1,100,0,0\n",
        0
    )]
    #[case::multiple_accounts_are_independent(
        "acct-1,1000,0,0\nacct-2,0,0,50\n",
        "withdraw,acct-1,,300,USD,1 Main St,,,,,,\n\
         withdraw,acct-2,,20,BVR,0xabc,,,,,,\n",
        "acct-1,700,0,0\nacct-2,0,0,30\n",
        0
    )]
    #[tokio::test]
    async fn test_pipeline(
        #[case] seed: &str,
        #[case] script: &str,
        #[case] expected_rows: &str,
        #[case] expected_failures: usize,
    ) {
        let (actual, failures) = run_pipeline(seed, script).await;
        let expected = format!("account,flowers,tickets,bvr_coins\n{expected_rows}");
        assert_eq!(
            actual, expected,
            "\n\nOutput mismatch\n\nActual:\n{actual}\nExpected:\n{expected}\n"
        );
        assert_eq!(failures, expected_failures);
    }

    #[tokio::test]
    async fn test_malformed_rows_are_skipped_and_the_rest_applied() {
        let (actual, failures) = run_pipeline(
            "acct-1,1000,0,0\n",
            "withdraw,acct-1,,not-a-number,USD,1 Main St,,,,,,\n\
             withdraw,acct-1,,100,USD,1 Main St,,,,,,\n",
        )
        .await;
        assert_eq!(failures, 1);
        assert!(actual.contains("acct-1,900,0,0"));
    }

    #[tokio::test]
    async fn test_unknown_account_withdrawal_is_recorded_as_failure() {
        let (actual, failures) = run_pipeline(
            "acct-1,1000,0,0\n",
            "withdraw,acct-9,,100,USD,1 Main St,,,,,,\n",
        )
        .await;
        assert_eq!(failures, 1);
        assert_eq!(actual, "account,flowers,tickets,bvr_coins\nacct-1,1000,0,0\n");
    }
}
