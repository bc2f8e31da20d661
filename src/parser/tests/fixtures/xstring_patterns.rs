// Test fixtures for backtick execution literals

pub const XSTRING_INTERPOLATED: &str = "`echo #{x}`\n";

pub const XSTRING_PLAIN: &str = "`ls -la`\n";

pub const XSTRING_MULTI: &str = "`cp #{src} #{dst}`\n";

pub const XSTRING_NESTED_CALL: &str = "`cat #{File.join(dir, name)}`\n";
