/// Fail fast with `ruc::eg!` when a condition does not hold.
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $msg:expr) => {
        if !($cond) {
            return Err(ruc::eg!($msg));
        }
    };
}
