use axum_test::TestResponse;

#[track_caller]
pub(crate) fn assert_content_type(response: &TestResponse, content_type: &str) {
    let content_type_header = response.header("content-type");
    assert_eq!(
        content_type_header
            .to_str()
            .expect("Could not convert to str"),
        content_type
    );
}

#[track_caller]
pub(crate) fn assert_attachment(response: &TestResponse, filename: &str) {
    let content_disposition = response.header("content-disposition");
    assert_eq!(
        content_disposition
            .to_str()
            .expect("Could not convert to str"),
        format!("attachment; filename=\"{filename}\"")
    );
}
