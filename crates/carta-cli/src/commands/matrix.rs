use carta_core::enums::FacilityType;
use carta_engine::MatrixRequest;

use crate::cli::root_commands::MatrixArgs;
use crate::cli::{GlobalFlags, OutputFormat};
use crate::commands::shared::parse::{parse_enum, parse_selector, parse_snapshot};
use crate::context::AppContext;
use crate::output::{output, print_table, table};

/// Handle `carta matrix`.
pub async fn handle(args: &MatrixArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let request = build_request(args, ctx.config.engine.default_radius_miles)?;
    let matrix = ctx.engine.build(&request).await?;

    if flags.format == OutputFormat::Table {
        print_table(|options| table::render_matrix(&matrix, options));
        return Ok(());
    }
    output(&matrix, flags.format)
}

fn build_request(args: &MatrixArgs, default_radius: f64) -> anyhow::Result<MatrixRequest> {
    let mut request = MatrixRequest::new(&args.facility_id, args.radius.unwrap_or(default_radius));
    if let Some(raw) = &args.facility_type {
        request = request.with_facility_type(parse_enum::<FacilityType>(raw, "facility type")?);
    }
    if let Some(snapshot) = parse_snapshot(args.snapshot.as_deref())? {
        request = request.with_snapshot(snapshot);
    }
    if !args.measures.is_empty() {
        let codes = args
            .measures
            .iter()
            .map(|code| code.trim())
            .filter(|code| !code.is_empty());
        request = request.with_measures(codes);
    }
    if let Some(raw) = &args.benchmark {
        request = request.with_benchmark(parse_selector(raw)?);
    }
    Ok(request)
}

#[cfg(test)]
mod tests {
    use carta_core::entities::BenchmarkSelector;
    use carta_core::enums::FacilityType;

    use super::build_request;
    use crate::cli::root_commands::MatrixArgs;

    fn args() -> MatrixArgs {
        MatrixArgs {
            facility_id: "F-ORIGIN".into(),
            radius: None,
            facility_type: None,
            snapshot: None,
            measures: Vec::new(),
            benchmark: None,
        }
    }

    #[test]
    fn defaults_leave_options_unset() {
        let request = build_request(&args(), 10.0).unwrap();
        assert_eq!(request.radius_miles, 10.0);
        assert_eq!(request.measures, None);
        assert_eq!(request.snapshot, None);
        assert_eq!(request.benchmark, None);
    }

    #[test]
    fn arguments_map_onto_request() {
        let mut a = args();
        a.radius = Some(3.5);
        a.facility_type = Some("hospital".into());
        a.measures = vec!["FALLS".into(), " STAR ".into()];
        a.benchmark = Some("county:12086".into());
        a.snapshot = Some("2024-02-01".into());

        let request = build_request(&a, 10.0).unwrap();
        assert_eq!(request.radius_miles, 3.5);
        assert_eq!(request.facility_type, Some(FacilityType::Hospital));
        assert_eq!(
            request.measures,
            Some(vec!["FALLS".to_string(), "STAR".to_string()])
        );
        assert_eq!(request.benchmark, Some(BenchmarkSelector::county("12086")));
        assert_eq!(request.snapshot.unwrap().to_string(), "2024-02-01");
    }

    #[test]
    fn bad_type_is_reported() {
        let mut a = args();
        a.facility_type = Some("castle".into());
        assert!(build_request(&a, 10.0).is_err());
    }
}
