//! The ten hand-written question templates, five per dataset. The SQL is
//! shared verbatim with the fixture generator, so the evaluator's exact row
//! comparison is meaningful.

/// A question label paired with the SQL that answers it.
#[derive(Debug)]
pub struct Template {
    pub label: &'static str,
    pub sql: &'static str,
}

pub const TEMPLATES: &[Template] = &[
    Template {
        label: "Top-3 boroughs by request volume in the last 30 days",
        sql: r#"
WITH mx AS (SELECT MAX(created_date) m FROM nyc_311)
SELECT borough, COUNT(*) AS cnt
FROM nyc_311, mx
WHERE borough IS NOT NULL
  AND created_date >= datetime(mx.m, '-30 days')
GROUP BY borough
ORDER BY cnt DESC
LIMIT 3;"#,
    },
    Template {
        label: "Top-10 complaint_type in the last 12 months with shares",
        sql: r#"
WITH mx AS (SELECT MAX(created_date) m FROM nyc_311),
     f AS (
       SELECT complaint_type
       FROM nyc_311, mx
       WHERE created_date >= datetime(mx.m, '-12 months')
     )
SELECT complaint_type, COUNT(*) AS cnt,
       ROUND(100.0 * COUNT(*) / (SELECT COUNT(*) FROM f), 2) AS pct
FROM f
GROUP BY complaint_type
ORDER BY cnt DESC
LIMIT 10;"#,
    },
    Template {
        label: "Borough with the shortest average close time (hours)",
        sql: r#"
SELECT borough,
       ROUND(AVG((julianday(closed_date) - julianday(created_date)) * 24), 2) AS avg_hours
FROM nyc_311
WHERE borough IS NOT NULL AND closed_date IS NOT NULL
GROUP BY borough
ORDER BY avg_hours ASC
LIMIT 1;"#,
    },
    Template {
        label: "Monthly trend of 'Noise'-related requests by borough (last 12 months)",
        sql: r#"
WITH mx AS (SELECT MAX(created_date) m FROM nyc_311),
     f AS (
       SELECT created_date, borough
       FROM nyc_311, mx
       WHERE created_date >= datetime(mx.m, '-12 months')
         AND borough IS NOT NULL
         AND (complaint_type LIKE '%Noise%' OR descriptor LIKE '%Noise%')
     )
SELECT strftime('%Y-%m', created_date) AS month, borough, COUNT(*) AS cnt
FROM f
GROUP BY month, borough
ORDER BY month, borough;"#,
    },
    Template {
        label: "Share of requests with status = 'Closed' for ZIPs starting with 100",
        sql: r#"
SELECT ROUND(100.0 * SUM(CASE WHEN status='Closed' THEN 1 ELSE 0 END) / COUNT(*), 2) AS closed_pct
FROM nyc_311
WHERE incident_zip LIKE '100%';"#,
    },
    Template {
        label: "Top-5 countries by average points",
        sql: r#"
SELECT country, ROUND(AVG(points), 2) AS avg_pts, COUNT(*) AS n
FROM wine_reviews
WHERE country IS NOT NULL
GROUP BY country
ORDER BY avg_pts DESC
LIMIT 5;"#,
    },
    Template {
        label: "Average points by price buckets",
        sql: r#"
SELECT bucket, ROUND(AVG(points), 2) AS avg_pts, COUNT(*) AS n
FROM (
  SELECT CASE
           WHEN price>=10 AND price<20  THEN '[10,20)'
           WHEN price>=20 AND price<50  THEN '[20,50)'
           WHEN price>=50 AND price<100 THEN '[50,100)'
           WHEN price>=100             THEN '[100,+)'
           ELSE 'other'
         END AS bucket, points
  FROM wine_reviews
  WHERE price IS NOT NULL
)
GROUP BY bucket
ORDER BY CASE bucket
  WHEN '[10,20)' THEN 1
  WHEN '[20,50)' THEN 2
  WHEN '[50,100)' THEN 3
  WHEN '[100,+)' THEN 4
  ELSE 5 END;"#,
    },
    Template {
        label: "Top-5 varieties by average points with n ≥ 500",
        sql: r#"
SELECT variety, COUNT(*) AS n, ROUND(AVG(points), 2) AS avg_pts
FROM wine_reviews
WHERE variety IS NOT NULL
GROUP BY variety
HAVING n >= 500
ORDER BY avg_pts DESC
LIMIT 5;"#,
    },
    Template {
        label: "Overall missing price percentage",
        sql: r#"
SELECT ROUND(100.0 * SUM(CASE WHEN price IS NULL THEN 1 ELSE 0 END) / COUNT(*), 2) AS missing_price_pct
FROM wine_reviews;"#,
    },
    Template {
        label: "Top-10 countries by count of missing price",
        sql: r#"
SELECT country, COUNT(*) AS missing
FROM wine_reviews
WHERE price IS NULL
GROUP BY country
ORDER BY missing DESC
LIMIT 10;"#,
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn ten_templates_five_per_dataset() {
        assert_eq!(TEMPLATES.len(), 10);
        let nyc = TEMPLATES.iter().filter(|t| t.sql.contains("nyc_311")).count();
        let wine = TEMPLATES
            .iter()
            .filter(|t| t.sql.contains("wine_reviews"))
            .count();
        assert_eq!(nyc, 5);
        assert_eq!(wine, 5);
    }

    #[test]
    fn labels_are_unique_and_nonempty() {
        let labels: HashSet<_> = TEMPLATES.iter().map(|t| t.label).collect();
        assert_eq!(labels.len(), TEMPLATES.len());
        assert!(TEMPLATES.iter().all(|t| !t.label.is_empty()));
        assert!(TEMPLATES.iter().all(|t| !t.sql.trim().is_empty()));
    }
}
