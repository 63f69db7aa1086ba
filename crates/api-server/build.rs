fn main() {
    // gRPC codegen for the payment facade. The message types are prost
    // derives in src/grpc.rs; only the service glue is generated here.
    let service = tonic_build::manual::Service::builder()
        .name("PaymentService")
        .package("foodordering.payment")
        .method(
            tonic_build::manual::Method::builder()
                .name("process_payment")
                .route_name("ProcessPayment")
                .input_type("crate::grpc::ProcessPaymentRequest")
                .output_type("crate::grpc::PaymentReply")
                .codec_path("tonic::codec::ProstCodec")
                .build(),
        )
        .method(
            tonic_build::manual::Method::builder()
                .name("refund_payment")
                .route_name("RefundPayment")
                .input_type("crate::grpc::RefundPaymentRequest")
                .output_type("crate::grpc::RefundReply")
                .codec_path("tonic::codec::ProstCodec")
                .build(),
        )
        .method(
            tonic_build::manual::Method::builder()
                .name("get_payment_status")
                .route_name("GetPaymentStatus")
                .input_type("crate::grpc::PaymentStatusRequest")
                .output_type("crate::grpc::PaymentStatusReply")
                .codec_path("tonic::codec::ProstCodec")
                .build(),
        )
        .build();

    tonic_build::manual::Builder::new().compile(&[service]);
}
