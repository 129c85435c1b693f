use crate::app::App;
use crate::commands::inventory::print_items;
use crate::output::{emit, print_table};

pub(crate) fn show(app: &App) -> anyhow::Result<()> {
    let summary = app
        .store
        .dashboard(app.today, app.config.dashboard.upcoming)?;

    emit(app.output, &summary, |s| {
        let m = &s.machines;
        println!("Machines: {} total, {} healthy, {} in alert", m.total, m.healthy, m.in_alert);
        println!("  warning: {}  critical: {}", m.warning, m.critical);
        println!("Open work orders: {}", s.open_work_orders);

        println!();
        println!("Upcoming maintenance (as of {})", app.today);
        let rows: Vec<_> = s
            .upcoming
            .iter()
            .map(|u| {
                let when = match u.days_until {
                    d if d < 0 => format!("{} days overdue", -d),
                    0 => "today".to_string(),
                    d => format!("in {d} days"),
                };
                vec![u.name.clone(), u.next_maintenance_date.clone(), when]
            })
            .collect();
        print_table(&["MACHINE", "DUE", "WHEN"], &rows);

        println!();
        println!("Low stock");
        print_items(&s.low_stock);
    })
}
