//! List rules command implementation.

use lin_rules::BUILTINS;

/// Runs the list-rules command.
pub fn run() {
    println!("Available rules:\n");
    println!("{:<8} {:<40} {:<8} Description", "Code", "Name", "Severity");
    println!("{}", "-".repeat(100));

    for builtin in BUILTINS {
        let meta = (builtin.meta)();
        println!(
            "{:<8} {:<40} {:<8} {}",
            meta.code,
            meta.name,
            meta.severity.to_string(),
            meta.description
        );
    }

    println!("\nPresets:");
    println!("  recommended  - LIN001, LIN004, LIN005, LIN007, LIN008, LIN010 (default)");
    println!("  strict       - All rules, reported as errors");
    println!("  minimal      - LIN004, LIN005 (for gradual adoption)");
    println!("  all          - All rules with default severities");

    println!("\nUse --rules to filter specific rules, e.g.:");
    println!("  lin check --rules no-find-view-by-id-calls,no-print-stack-trace-calls");
    println!("  lin check --rules LIN004,LIN007");
}
