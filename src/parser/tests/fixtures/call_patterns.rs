// Test fixtures for call detection patterns

pub const SCENARIO_CALLS: &str = "foo()\nbar.baz(1, \"x\")\n";

pub const NESTED_CALLS: &str = r#"def read_config(path)
  JSON.parse(File.read(path))
end
"#;

pub const CHAINED_CALLS: &str = r#"client.connection.get("/status")
"#;

pub const COMMAND_CALLS: &str = r#"require "open3"
system "rm", "-rf", dir
Kernel.exec "ls"
"#;

pub const BLOCK_CALLS: &str = r#"files.each do |f|
  puts(f)
end
"#;

pub const SAFE_NAVIGATION: &str = r#"user&.name
"#;

pub const SINGLETON_METHOD: &str = r#"class Runner
  def self.launch(cmd)
    Process.spawn(cmd)
  end

  def stop
    Process.kill("TERM", @pid)
  end
end
"#;

pub const SYNTAX_ERROR: &str = r#"def broken(
  )))
"#;

pub const BRACE_BLOCK_CALL: &str = "items.map { |i| i * 2 }\n";

pub const BLOCK_CALL_WITH_ARGS: &str = r#"File.open(path, "w") do |io|
  io.write(data)
end
"#;

pub const MULTIBYTE_PREFIX: &str = "s = \"éé\"; File.open(s)\n";

pub const BARE_CALLS: &str = r#"exit
fork
x = 1
x
puts gets
"#;

pub const LOCAL_SCOPES: &str = r#"token = fetch
def run(arg)
  token
  arg
end
[1].each { |n| n; token }
"#;

pub const ATTRIBUTE_SETTER: &str = "config.timeout = 30\n";

pub const SUPER_CALL: &str = r#"class Child < Base
  def initialize(name)
    super(name)
    setup
  end
end
"#;
