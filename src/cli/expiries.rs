use crate::cli::ExpiriesArgs;
use crate::domain::expiry::next_expiries;

/// Print upcoming expiries, one `YYYYMMDD` per line.
pub fn execute(args: &ExpiriesArgs) {
    for expiry in next_expiries(args.count, args.cboe) {
        println!("{expiry}");
    }
}
