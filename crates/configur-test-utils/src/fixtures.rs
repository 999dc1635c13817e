//! INI sources shared by several test suites.

/// Flat database settings with a comment and mixed scalar types.
pub const DB_INI: &str = "; database\r\nhost = \"localhost\"\r\nport = 5432\r\ndebug = off";

/// Application settings with a section and a sub-array.
pub const APP_INI: &str = "name = \"demo\"\n\n[paths]\nroot = \"/srv/app\"\nlibs[] = \"core\"\nlibs[] = \"extra\"\n";

/// Every boolean and null keyword the reader understands.
pub const KEYWORDS_INI: &str = "a = true\nb = on\nc = yes\nd = false\ne = off\nf = no\ng = none\nh = null\n";
