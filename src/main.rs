fn main() -> anyhow::Result<()> {
    erp_dashboard_lib::run()
}
