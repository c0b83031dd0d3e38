use bitflags::bitflags;
use std::fmt;

bitflags! {
    /// Why a rule did or did not produce a URL. An empty set is success.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct CreateStatus: u8 {
        const PARSING_ONLY = 0b0000_0001;
        const ROUTE_MISMATCH = 0b0000_0010;
        const PARAMS_MISMATCH = 0b0000_0100;
    }
}

impl CreateStatus {
    pub const SUCCESS: Self = Self::empty();

    pub fn is_success(&self) -> bool {
        self.is_empty()
    }
}

impl fmt::Display for CreateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_success() {
            return f.write_str("SUCCESS");
        }
        let mut first = true;
        for (name, _) in self.iter_names() {
            if !first {
                f.write_str("|")?;
            }
            f.write_str(name)?;
            first = false;
        }
        Ok(())
    }
}
