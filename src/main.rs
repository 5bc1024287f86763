fn main() {
    ga4_mcp::run();
}
